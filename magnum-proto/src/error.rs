//! Error types for the protocol boundary

use thiserror::Error;

/// Failures of the underlying device connection.
///
/// Produced by every fallible [`RouterConnection`](crate::RouterConnection)
/// method and propagated synchronously to whoever issued the call.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Establishing the connection failed.
    #[error("connect failed: {0}")]
    Connect(String),

    /// A command or read request could not be sent.
    #[error("send failed: {0}")]
    Send(String),

    /// The connection is closed or was never opened.
    #[error("connection closed")]
    Closed,

    /// An I/O error from the socket layer.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the level code ↔ index mapping.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    /// The character is not in the fixed level alphabet.
    #[error("unknown level code: {0:?}")]
    UnknownCode(char),

    /// The dense index is past the end of the alphabet.
    #[error("level index out of range: {0}")]
    IndexOutOfRange(usize),
}
