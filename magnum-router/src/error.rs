//! Error types for magnum-router

use magnum_proto::{LevelError, TransportError};
use thiserror::Error;

/// Result type for router operations
pub type Result<T> = std::result::Result<T, RouterError>;

/// Errors surfaced by the router's public surface.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The underlying transport failed to send or connect.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A level code or index could not be mapped.
    #[error("level mapping error: {0}")]
    Level(#[from] LevelError),

    /// Connect was called while the dispatcher is already running, or
    /// the transport's message stream was already consumed.
    #[error("router is already running")]
    AlreadyRunning,
}
