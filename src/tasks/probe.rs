//! Availability Probe Task
//!
//! Background task that periodically pings the backing store so the
//! availability flag tracks recovery even when no requests arrive.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that probes the cache store every `interval`.
///
/// Each probe runs on the blocking pool, off the request path. Recovery and
/// degradation are logged by the store itself, once per transition.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(CacheStore::connect(&config));
/// let probe_handle = spawn_availability_probe(store.clone(), Duration::from_secs(30));
/// // Later, during shutdown:
/// probe_handle.abort();
/// ```
pub fn spawn_availability_probe(store: Arc<CacheStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting cache availability probe with interval of {} ms",
            interval.as_millis()
        );

        loop {
            tokio::time::sleep(interval).await;

            let target = store.clone();
            let available = tokio::task::spawn_blocking(move || target.probe())
                .await
                .unwrap_or(false);

            debug!(available, "Cache availability probe finished");
        }
    })
}
