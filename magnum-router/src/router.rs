//! Router facade
//!
//! [`Router`] ties the pieces together: it owns the transport, the
//! cache, and the dispatcher task, and exposes the public lifecycle,
//! command, and accessor surface.
//!
//! Commands are fire-and-forget with respect to local state: the cache
//! only reflects a `set_route`/`set_lock` once the device's resulting
//! notification comes back through the dispatcher. If the device
//! silently rejects a command, nothing changes locally, so callers that
//! need confirmation poll the cache with their own timeout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use magnum_proto::{Level, RouterConnection};

use crate::dispatcher::spawn_dispatcher;
use crate::sync::run_bulk_sync;
use crate::{Result, RouteCache, RouterConfig, RouterError};

/// A live session against one routing matrix.
///
/// Reads are served from the in-process cache and are eventually
/// consistent with the device; the device itself is the single source
/// of truth.
pub struct Router<C: RouterConnection> {
    conn: C,
    cache: RouteCache,
    stop: watch::Sender<bool>,
    dispatcher: Option<JoinHandle<()>>,
    protocol_errors: Arc<AtomicU64>,
}

impl<C: RouterConnection> Router<C> {
    /// Build a router over an (unconnected) transport, sizing the cache
    /// from the config. The transport carries the device address.
    pub fn new(conn: C, config: &RouterConfig) -> Self {
        let (stop, _) = watch::channel(false);

        Self {
            conn,
            cache: RouteCache::new(config),
            stop,
            dispatcher: None,
            protocol_errors: Arc::new(AtomicU64::new(0)),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Connect and populate the cache.
    ///
    /// The dispatcher starts before the transport connects so that no
    /// early notification is dropped. After the link is up, a bulk sync
    /// pass requests every name, lock, and route; the replies stream in
    /// asynchronously.
    ///
    /// On any failure the dispatcher is stopped and the error returned.
    /// Whatever the sync populated before the failure stays in the
    /// cache; treat a failed connect's cache contents as unreliable.
    pub async fn connect(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(RouterError::AlreadyRunning);
        }

        let messages = self
            .conn
            .take_messages()
            .ok_or(RouterError::AlreadyRunning)?;

        self.stop.send_replace(false);
        self.dispatcher = Some(spawn_dispatcher(
            self.cache.clone(),
            messages,
            self.stop.subscribe(),
            Arc::clone(&self.protocol_errors),
        ));

        if let Err(err) = self.conn.connect().await {
            self.stop.send_replace(true);
            return Err(err.into());
        }

        if let Err(err) = run_bulk_sync(&self.conn, &self.cache).await {
            tracing::warn!(%err, "bulk sync aborted, cache is partially populated");
            self.stop.send_replace(true);
            return Err(err);
        }

        tracing::info!(
            sources = self.cache.source_count(),
            destinations = self.cache.destination_count(),
            levels = self.cache.level_count(),
            "connected, state sync in flight"
        );
        Ok(())
    }

    /// Stop the dispatcher and close the transport.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.stop.send_replace(true);

        let result = self.conn.disconnect().await;

        if let Some(handle) = self.dispatcher.take() {
            if let Err(err) = handle.await {
                tracing::warn!(%err, "dispatcher task did not shut down cleanly");
            }
        }

        result.map_err(RouterError::from)
    }

    /// Whether the dispatcher task is live.
    pub fn is_running(&self) -> bool {
        !*self.stop.borrow()
            && self
                .dispatcher
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Route `source` to `destination` across the given levels with a
    /// single crosspoint command.
    ///
    /// Does not touch the cache; the change becomes visible once the
    /// device notifies.
    pub async fn set_route(&self, levels: &[Level], destination: u32, source: u32) -> Result<()> {
        self.conn
            .set_crosspoint(levels, destination, source)
            .await?;
        Ok(())
    }

    /// Lock or unlock a destination. Same non-update contract as
    /// [`set_route`](Self::set_route).
    pub async fn set_lock(&self, destination: u32, locked: bool) -> Result<()> {
        if locked {
            self.conn.lock_destination(destination).await?;
        } else {
            self.conn.unlock_destination(destination).await?;
        }
        Ok(())
    }

    // ========================================================================
    // Cached state
    // ========================================================================

    /// Cached source routed to `destination` on `level`; 0 = unassigned.
    pub fn route(&self, level: Level, destination: u32) -> u32 {
        self.cache.route(level, destination)
    }

    /// Cached source name; empty until synced.
    pub fn source_name(&self, source: u32) -> String {
        self.cache.source_name(source)
    }

    /// Cached destination name; empty until synced.
    pub fn destination_name(&self, destination: u32) -> String {
        self.cache.destination_name(destination)
    }

    /// Cached destination lock flag; false until synced.
    pub fn destination_locked(&self, destination: u32) -> bool {
        self.cache.destination_locked(destination)
    }

    /// Snapshot of the route table: `[destination][level index] -> source`.
    pub fn route_table(&self) -> Vec<Vec<u32>> {
        self.cache.route_table()
    }

    /// Snapshot of the source name table, indexed by source ID.
    pub fn source_name_table(&self) -> Vec<String> {
        self.cache.source_name_table()
    }

    /// Snapshot of the destination name table, indexed by destination ID.
    pub fn destination_name_table(&self) -> Vec<String> {
        self.cache.destination_name_table()
    }

    /// Snapshot of the destination lock table, indexed by destination ID.
    pub fn destination_lock_table(&self) -> Vec<bool> {
        self.cache.destination_lock_table()
    }

    /// Number of device-reported protocol errors observed this session.
    pub fn protocol_error_count(&self) -> u64 {
        self.protocol_errors.load(Ordering::Relaxed)
    }

    /// A handle to the underlying cache for embedding callers.
    pub fn cache(&self) -> RouteCache {
        self.cache.clone()
    }
}
