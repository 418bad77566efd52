//! Protocol boundary for the Magnum router SDK
//!
//! This crate defines everything the state-sync engine in
//! `magnum-router` needs to talk to a router without knowing the wire:
//!
//! - [`RouterMessage`]: the tagged union of decoded inbound messages
//! - [`Level`]: validated mapping between single-character level codes
//!   and dense local indices
//! - [`RouterConnection`]: the trait a concrete transport implements
//! - [`TransportError`] / [`LevelError`]: the two error families of the
//!   boundary

mod connection;
mod error;
mod level;
mod message;

pub use connection::RouterConnection;
pub use error::{LevelError, TransportError};
pub use level::{Level, LEVEL_CODES, MAX_LEVELS};
pub use message::RouterMessage;
