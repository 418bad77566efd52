//! Transport seam
//!
//! The wire-level connection (framing, encode/decode, reconnect policy)
//! lives outside this SDK. Implementations hand decoded messages to the
//! SDK through an mpsc channel and expose typed send methods; the SDK
//! never sees bytes.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{Level, RouterMessage, TransportError};

/// A persistent connection to a Quartz-protocol router.
///
/// All send methods may block on transport backpressure and fail with a
/// [`TransportError`]. None of them wait for the device's reply, which
/// arrives on the inbound message channel like any other notification.
#[async_trait]
pub trait RouterConnection: Send + Sync {
    /// Open the connection.
    async fn connect(&self) -> Result<(), TransportError>;

    /// Close the connection. Pending sends against a closing transport
    /// must fail with a transport error rather than hang.
    async fn disconnect(&self) -> Result<(), TransportError>;

    /// Request the name of one source.
    async fn request_source_name(&self, source: u32) -> Result<(), TransportError>;

    /// Request the name of one destination.
    async fn request_destination_name(&self, destination: u32) -> Result<(), TransportError>;

    /// Request the lock status of one destination.
    async fn request_destination_lock(&self, destination: u32) -> Result<(), TransportError>;

    /// Request the current route for one (level, destination) pair.
    async fn request_route(&self, level: Level, destination: u32) -> Result<(), TransportError>;

    /// Set a crosspoint across one or more levels in a single command.
    async fn set_crosspoint(
        &self,
        levels: &[Level],
        destination: u32,
        source: u32,
    ) -> Result<(), TransportError>;

    /// Lock a destination against route changes.
    async fn lock_destination(&self, destination: u32) -> Result<(), TransportError>;

    /// Release a destination lock.
    async fn unlock_destination(&self, destination: u32) -> Result<(), TransportError>;

    /// Take ownership of the inbound message stream.
    ///
    /// Returns `Some` exactly once; the stream is single-consumer. The
    /// channel closing (recv yielding `None`) means the transport
    /// dropped the connection.
    fn take_messages(&mut self) -> Option<mpsc::Receiver<RouterMessage>>;
}
