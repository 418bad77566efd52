//! Routing state cache
//!
//! The single in-process owner of mirrored router state: source names,
//! destination names, destination locks, and the route table. Written
//! only by the update dispatcher after initial sync; read from any
//! caller thread.
//!
//! All tables sit behind one coarse reader/writer lock. Contention is
//! low (one writer task, occasional reads), and the coarse lock makes
//! whole-table reads coherent snapshots rather than torn views.
//!
//! Values are stale-tolerant by contract: until sync has covered an
//! entry, reads return the default (empty name, unlocked, source 0 =
//! unassigned). There is no "not yet known" sentinel.

use std::sync::Arc;

use parking_lot::RwLock;

use magnum_proto::Level;

use crate::RouterConfig;

struct Tables {
    source_names: Vec<String>,
    destination_names: Vec<String>,
    destination_locks: Vec<bool>,
    /// routes[destination][level index] = source ID, 0 = unassigned.
    routes: Vec<Vec<u32>>,
}

/// Cheaply clonable handle to the shared state tables.
///
/// Index 0 of the source and destination spaces is reserved by the
/// protocol and never populated by sync.
#[derive(Clone)]
pub struct RouteCache {
    inner: Arc<RwLock<Tables>>,
    source_count: u32,
    destination_count: u32,
    level_count: usize,
}

impl RouteCache {
    /// Create an empty cache sized from the session config.
    pub fn new(config: &RouterConfig) -> Self {
        let sources = config.source_count as usize + 1;
        let destinations = config.destination_count as usize + 1;

        let tables = Tables {
            source_names: vec![String::new(); sources],
            destination_names: vec![String::new(); destinations],
            destination_locks: vec![false; destinations],
            routes: vec![vec![0; config.level_count]; destinations],
        };

        Self {
            inner: Arc::new(RwLock::new(tables)),
            source_count: config.source_count,
            destination_count: config.destination_count,
            level_count: config.level_count,
        }
    }

    pub fn source_count(&self) -> u32 {
        self.source_count
    }

    pub fn destination_count(&self) -> u32 {
        self.destination_count
    }

    pub fn level_count(&self) -> usize {
        self.level_count
    }

    // ========================================================================
    // Reads (O(1), stale-tolerant)
    // ========================================================================

    /// Cached source for a (level, destination) pair. 0 means unassigned.
    pub fn route(&self, level: Level, destination: u32) -> u32 {
        let tables = self.inner.read();
        tables
            .routes
            .get(destination as usize)
            .and_then(|row| row.get(level.index()))
            .copied()
            .unwrap_or(0)
    }

    /// Cached name of a source; empty until synced.
    pub fn source_name(&self, source: u32) -> String {
        let tables = self.inner.read();
        tables
            .source_names
            .get(source as usize)
            .cloned()
            .unwrap_or_default()
    }

    /// Cached name of a destination; empty until synced.
    pub fn destination_name(&self, destination: u32) -> String {
        let tables = self.inner.read();
        tables
            .destination_names
            .get(destination as usize)
            .cloned()
            .unwrap_or_default()
    }

    /// Cached lock flag of a destination; false until synced.
    pub fn destination_locked(&self, destination: u32) -> bool {
        let tables = self.inner.read();
        tables
            .destination_locks
            .get(destination as usize)
            .copied()
            .unwrap_or(false)
    }

    // ========================================================================
    // Whole-table snapshots
    // ========================================================================

    /// Snapshot of the route table: `[destination][level index] -> source`.
    pub fn route_table(&self) -> Vec<Vec<u32>> {
        self.inner.read().routes.clone()
    }

    /// Snapshot of the source name table, indexed by source ID.
    pub fn source_name_table(&self) -> Vec<String> {
        self.inner.read().source_names.clone()
    }

    /// Snapshot of the destination name table, indexed by destination ID.
    pub fn destination_name_table(&self) -> Vec<String> {
        self.inner.read().destination_names.clone()
    }

    /// Snapshot of the destination lock table, indexed by destination ID.
    pub fn destination_lock_table(&self) -> Vec<bool> {
        self.inner.read().destination_locks.clone()
    }

    // ========================================================================
    // Writes (dispatcher only)
    // ========================================================================

    pub(crate) fn set_route(&self, destination: u32, level: Level, source: u32) {
        let mut tables = self.inner.write();
        match tables
            .routes
            .get_mut(destination as usize)
            .and_then(|row| row.get_mut(level.index()))
        {
            Some(slot) => *slot = source,
            None => tracing::warn!(
                destination,
                level = %level,
                source,
                "dropping route update outside configured dimensions"
            ),
        }
    }

    pub(crate) fn set_source_name(&self, source: u32, name: String) {
        let mut tables = self.inner.write();
        match tables.source_names.get_mut(source as usize) {
            Some(slot) => *slot = name,
            None => tracing::warn!(source, "dropping name for out-of-range source"),
        }
    }

    pub(crate) fn set_destination_name(&self, destination: u32, name: String) {
        let mut tables = self.inner.write();
        match tables.destination_names.get_mut(destination as usize) {
            Some(slot) => *slot = name,
            None => tracing::warn!(destination, "dropping name for out-of-range destination"),
        }
    }

    pub(crate) fn set_destination_lock(&self, destination: u32, locked: bool) {
        let mut tables = self.inner.write();
        match tables.destination_locks.get_mut(destination as usize) {
            Some(slot) => *slot = locked,
            None => tracing::warn!(destination, "dropping lock for out-of-range destination"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cache() -> RouteCache {
        RouteCache::new(&RouterConfig {
            source_count: 4,
            destination_count: 2,
            level_count: 2,
        })
    }

    #[test]
    fn new_cache_is_empty() {
        let cache = test_cache();
        let level0 = Level::from_index(0).unwrap();

        assert_eq!(cache.route(level0, 1), 0);
        assert_eq!(cache.source_name(1), "");
        assert_eq!(cache.destination_name(2), "");
        assert!(!cache.destination_locked(1));
    }

    #[test]
    fn tables_carry_reserved_slot_zero() {
        let cache = test_cache();
        assert_eq!(cache.source_name_table().len(), 5);
        assert_eq!(cache.destination_name_table().len(), 3);
        assert_eq!(cache.destination_lock_table().len(), 3);
        assert_eq!(cache.route_table().len(), 3);
        assert_eq!(cache.route_table()[1].len(), 2);
    }

    #[test]
    fn writes_are_readable() {
        let cache = test_cache();
        let level1 = Level::from_index(1).unwrap();

        cache.set_route(2, level1, 4);
        cache.set_source_name(4, "CAM4".into());
        cache.set_destination_name(2, "AUX".into());
        cache.set_destination_lock(2, true);

        assert_eq!(cache.route(level1, 2), 4);
        assert_eq!(cache.source_name(4), "CAM4");
        assert_eq!(cache.destination_name(2), "AUX");
        assert!(cache.destination_locked(2));
    }

    #[test]
    fn out_of_range_writes_are_dropped() {
        let cache = test_cache();
        let level0 = Level::from_index(0).unwrap();
        let level9 = Level::from_index(9).unwrap();

        cache.set_route(99, level0, 1);
        cache.set_route(1, level9, 1);
        cache.set_source_name(99, "X".into());
        cache.set_destination_lock(99, true);

        assert_eq!(cache.route_table(), RouteCache::new(&RouterConfig {
            source_count: 4,
            destination_count: 2,
            level_count: 2,
        }).route_table());
    }

    #[test]
    fn out_of_range_reads_yield_defaults() {
        let cache = test_cache();
        let level9 = Level::from_index(9).unwrap();

        assert_eq!(cache.route(level9, 1), 0);
        assert_eq!(cache.route(Level::VIDEO, 99), 0);
        assert_eq!(cache.source_name(99), "");
        assert!(!cache.destination_locked(99));
    }

    #[test]
    fn last_writer_wins_per_slot() {
        use proptest::prelude::*;

        proptest!(|(writes in proptest::collection::vec((1u32..=2, 0usize..2, 0u32..=4), 1..64))| {
            let cache = test_cache();
            let mut expected = [[0u32; 2]; 3];

            for (destination, level_idx, source) in writes {
                let level = Level::from_index(level_idx).unwrap();
                cache.set_route(destination, level, source);
                expected[destination as usize][level_idx] = source;
            }

            for destination in 1u32..=2 {
                for level_idx in 0..2 {
                    let level = Level::from_index(level_idx).unwrap();
                    prop_assert_eq!(
                        cache.route(level, destination),
                        expected[destination as usize][level_idx]
                    );
                }
            }
        });
    }

    #[test]
    fn snapshots_are_decoupled_from_later_writes() {
        let cache = test_cache();
        let snapshot = cache.route_table();

        cache.set_route(1, Level::VIDEO, 3);

        assert_eq!(snapshot[1][0], 0);
        assert_eq!(cache.route_table()[1][0], 3);
    }
}
