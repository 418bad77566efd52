//! Magnum Router State Sync
//!
//! Mirrors the live state of a Magnum audio/video routing matrix into
//! an in-process cache, kept current by consuming the router's
//! notification stream over a persistent Quartz-protocol connection.
//!
//! # Architecture
//!
//! ```text
//! Transport ──messages──▶ Dispatcher ──writes──▶ RouteCache ◀── accessors
//!     ▲                                              ▲
//!     └── Commands (set_route / set_lock)            └── Bulk sync replies
//! ```
//!
//! Commands mutate the remote device only; the cache reflects the
//! change once the device's own notification comes back through the
//! dispatcher. The device is the single source of truth — the cache is
//! eventually consistent, never authoritative.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use magnum_router::{Router, RouterConfig};
//! use magnum_proto::Level;
//!
//! let config = RouterConfig { source_count: 128, destination_count: 64, level_count: 17 };
//! let mut router = Router::new(connection, &config);
//! router.connect().await?;
//!
//! // Route source 7 to destination 3 on video + first audio level.
//! let levels = [Level::from_code('V')?, Level::from_code('A')?];
//! router.set_route(&levels, 3, 7).await?;
//!
//! // Reads come from the cache and may lag the device briefly.
//! println!("{} -> {}", router.source_name(7), router.destination_name(3));
//! ```

mod cache;
mod config;
mod dispatcher;
mod router;
mod sync;

// Error types
pub mod error;

// Logging infrastructure
pub mod logging;

pub use cache::RouteCache;
pub use config::RouterConfig;
pub use error::{Result, RouterError};
pub use router::Router;
pub use sync::request_volume;

pub use logging::{init_logging, init_logging_from_env, init_silent, LoggingError, LoggingMode};

// Re-export the boundary types callers need to drive the router.
pub use magnum_proto::{
    Level, LevelError, RouterConnection, RouterMessage, TransportError, LEVEL_CODES, MAX_LEVELS,
};
