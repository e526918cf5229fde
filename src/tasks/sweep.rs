//! Expiry Sweep Task
//!
//! Background task that periodically purges expired cache entries.
//! Reads already treat expired entries as absent, so this only reclaims
//! memory held by entries nobody reads.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a task purging expired entries every `interval_secs` seconds.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be aborted during
/// graceful shutdown.
///
/// # Example
/// ```ignore
/// let sweep_handle = spawn_sweep_task(cache.clone(), 5);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<V>(cache: SharedCache<V>, interval_secs: u64) -> JoinHandle<()>
where
    V: Send + 'static,
{
    let interval = Duration::from_secs(interval_secs.max(1));
    spawn_with_interval(cache, interval)
}

fn spawn_with_interval<V>(cache: SharedCache<V>, interval: Duration) -> JoinHandle<()>
where
    V: Send + 'static,
{
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting expiry sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired();
            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
