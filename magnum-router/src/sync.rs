//! Bulk sync orchestrator
//!
//! On connect the cache is empty; this pass asks the device to emit its
//! full current state by issuing one read request per entity. Requests
//! are serial and fire-and-forget; the replies arrive interleaved with
//! unsolicited updates on the inbound stream and are applied by the
//! dispatcher like any other notification. There is no correlation on
//! the wire, so "sync complete" is a best-effort notion: callers who
//! need it poll the cache or wait for the stream to go quiet.

use magnum_proto::{Level, RouterConnection};

use crate::{Result, RouteCache};

/// Issue the full inventory of read requests for the cache's dimensions.
///
/// Order: source names, then destination names and locks, then routes in
/// destination-major, level-minor order. Aborts on the first send
/// failure without retrying or skipping ahead.
pub(crate) async fn run_bulk_sync<C: RouterConnection>(conn: &C, cache: &RouteCache) -> Result<()> {
    tracing::debug!(
        requests = request_volume(cache),
        "starting bulk state sync"
    );

    for source in 1..=cache.source_count() {
        conn.request_source_name(source).await?;
    }

    for destination in 1..=cache.destination_count() {
        conn.request_destination_name(destination).await?;
        conn.request_destination_lock(destination).await?;
    }

    for destination in 1..=cache.destination_count() {
        for index in 0..cache.level_count() {
            let level = Level::from_index(index)?;
            conn.request_route(level, destination).await?;
        }
    }

    tracing::debug!("bulk state sync requests issued");
    Ok(())
}

/// Total number of requests a full sync issues for this cache's
/// dimensions. Useful for sizing caller-side quiet-period timeouts.
pub fn request_volume(cache: &RouteCache) -> usize {
    cache.source_count() as usize
        + cache.destination_count() as usize * (2 + cache.level_count())
}
