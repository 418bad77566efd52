//! Async update dispatcher
//!
//! A background task that drains the transport's inbound message stream
//! and applies each message to the cache, in arrival order. It is the
//! sole writer of cache state after construction; command issuers never
//! touch the cache directly and rely on the device echoing every change
//! back through this loop.
//!
//! Shutdown is a `watch` signal rather than a polled flag so the loop
//! terminates promptly even while blocked on an idle stream.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use magnum_proto::{Level, RouterMessage};

use crate::RouteCache;

/// Spawn the dispatcher task.
///
/// Exits when `stop` flips to true, or when the message channel closes
/// (the transport dropped the connection, treated as an implicit
/// disconnect).
pub(crate) fn spawn_dispatcher(
    cache: RouteCache,
    mut messages: mpsc::Receiver<RouterMessage>,
    mut stop: watch::Receiver<bool>,
    protocol_errors: Arc<AtomicU64>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::debug!("update dispatcher started");

        loop {
            tokio::select! {
                biased;

                changed = stop.changed() => {
                    // Err means the router owning the sender is gone.
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                msg = messages.recv() => {
                    match msg {
                        Some(msg) => apply_message(&cache, &protocol_errors, msg),
                        None => {
                            tracing::warn!("transport closed the message stream, dispatcher exiting");
                            break;
                        }
                    }
                }
            }
        }

        tracing::debug!("update dispatcher stopped");
    })
}

/// Apply one decoded message to the cache.
fn apply_message(cache: &RouteCache, protocol_errors: &AtomicU64, msg: RouterMessage) {
    match msg {
        RouterMessage::Ack => {}
        RouterMessage::PowerOn => {
            tracing::info!("router reported power-on");
        }
        RouterMessage::Error { code } => {
            // Uncorrelated to any request, so it cannot be surfaced to a
            // caller; count it and move on.
            protocol_errors.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(%code, "router reported a protocol error");
        }
        RouterMessage::RouteUpdate {
            destination,
            levels,
            source,
        } => {
            for code in levels {
                match Level::from_code(code) {
                    Ok(level) => cache.set_route(destination, level, source),
                    Err(err) => {
                        tracing::warn!(%err, destination, source, "skipping unmappable level in route update");
                    }
                }
            }
        }
        RouterMessage::DestinationName { destination, name } => {
            cache.set_destination_name(destination, name);
        }
        RouterMessage::SourceName { source, name } => {
            cache.set_source_name(source, name);
        }
        RouterMessage::LevelName { level, .. } => {
            // Level reads are unsupported by this router class.
            tracing::debug!(%level, "ignoring level-name reply");
        }
        RouterMessage::LockStatus {
            destination,
            locked,
        } => {
            cache.set_destination_lock(destination, locked);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RouterConfig;

    fn test_cache() -> RouteCache {
        RouteCache::new(&RouterConfig {
            source_count: 4,
            destination_count: 2,
            level_count: 2,
        })
    }

    fn counter() -> Arc<AtomicU64> {
        Arc::new(AtomicU64::new(0))
    }

    #[test]
    fn route_update_writes_each_level() {
        let cache = test_cache();
        apply_message(
            &cache,
            &counter(),
            RouterMessage::RouteUpdate {
                destination: 1,
                levels: vec!['V', 'A'],
                source: 3,
            },
        );

        assert_eq!(cache.route(Level::from_code('V').unwrap(), 1), 3);
        assert_eq!(cache.route(Level::from_code('A').unwrap(), 1), 3);
    }

    #[test]
    fn last_route_update_wins() {
        let cache = test_cache();
        let errors = counter();
        for source in [2, 4, 1] {
            apply_message(
                &cache,
                &errors,
                RouterMessage::RouteUpdate {
                    destination: 1,
                    levels: vec!['V'],
                    source,
                },
            );
        }
        assert_eq!(cache.route(Level::VIDEO, 1), 1);
    }

    #[test]
    fn unmappable_level_does_not_abort_the_update() {
        let cache = test_cache();
        apply_message(
            &cache,
            &counter(),
            RouterMessage::RouteUpdate {
                destination: 1,
                levels: vec!['?', 'V'],
                source: 2,
            },
        );
        assert_eq!(cache.route(Level::VIDEO, 1), 2);
    }

    #[test]
    fn name_and_lock_replies_update_tables() {
        let cache = test_cache();
        let errors = counter();

        apply_message(
            &cache,
            &errors,
            RouterMessage::SourceName {
                source: 1,
                name: "CAM1".into(),
            },
        );
        apply_message(
            &cache,
            &errors,
            RouterMessage::DestinationName {
                destination: 1,
                name: "PGM".into(),
            },
        );
        apply_message(
            &cache,
            &errors,
            RouterMessage::LockStatus {
                destination: 1,
                locked: true,
            },
        );

        assert_eq!(cache.source_name(1), "CAM1");
        assert_eq!(cache.destination_name(1), "PGM");
        assert!(cache.destination_locked(1));
    }

    #[test]
    fn error_messages_are_counted_not_applied() {
        let cache = test_cache();
        let errors = counter();

        apply_message(
            &cache,
            &errors,
            RouterMessage::Error {
                code: "ERR 01".into(),
            },
        );
        apply_message(&cache, &errors, RouterMessage::Ack);
        apply_message(&cache, &errors, RouterMessage::PowerOn);
        apply_message(
            &cache,
            &errors,
            RouterMessage::LevelName {
                level: 'V',
                name: "Video".into(),
            },
        );

        assert_eq!(errors.load(Ordering::Relaxed), 1);
        assert_eq!(cache.route_table(), test_cache().route_table());
    }

    #[tokio::test]
    async fn stop_signal_terminates_an_idle_dispatcher() {
        let cache = test_cache();
        let (_tx, rx) = mpsc::channel(8);
        let (stop_tx, stop_rx) = watch::channel(false);

        let handle = spawn_dispatcher(cache, rx, stop_rx, counter());
        stop_tx.send(true).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("dispatcher should stop promptly")
            .unwrap();
    }

    #[tokio::test]
    async fn closed_channel_terminates_the_dispatcher() {
        let cache = test_cache();
        let (tx, rx) = mpsc::channel(8);
        let (_stop_tx, stop_rx) = watch::channel(false);

        let handle = spawn_dispatcher(cache, rx, stop_rx, counter());
        drop(tx);

        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("dispatcher should exit on transport close")
            .unwrap();
    }
}
