//! Decoded inbound protocol messages
//!
//! The transport decodes the wire into these variants; the dispatcher
//! in `magnum-router` matches them exhaustively. Route updates carry
//! their levels as raw wire codes; mapping to dense indices happens at
//! the consumer, so one unmappable code does not invalidate the rest of
//! the message.

use serde::{Deserialize, Serialize};

/// A decoded message from the device, tagged by kind.
///
/// The device broadcasts every state change as a notification,
/// including changes caused by this process's own commands; there is no
/// request/response correlation on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouterMessage {
    /// Command acknowledged. Carries no state.
    Ack,

    /// Device-reported protocol error. Asynchronous and uncorrelated to
    /// any specific request.
    Error { code: String },

    /// The device (re)started.
    PowerOn,

    /// A crosspoint changed: `source` is now routed to `destination` on
    /// each of the named levels.
    RouteUpdate {
        destination: u32,
        levels: Vec<char>,
        source: u32,
    },

    /// Reply to a destination-name read.
    DestinationName { destination: u32, name: String },

    /// Reply to a source-name read.
    SourceName { source: u32, name: String },

    /// Reply to a level-name read. Not supported by the router class
    /// this SDK targets.
    LevelName { level: char, name: String },

    /// Reply to a lock read, or an unsolicited lock change.
    LockStatus { destination: u32, locked: bool },
}
