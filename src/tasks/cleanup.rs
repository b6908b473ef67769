//! Expiry Sweep Task
//!
//! Background task that periodically removes dead cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Cache;

/// Spawns a background task that periodically sweeps dead cache entries.
///
/// The task sleeps for `cleanup_interval_secs` between sweeps and runs until
/// aborted through the returned handle.
///
/// # Example
/// ```ignore
/// let cache: Cache<serde_json::Value> = Cache::new(CacheConfig::default());
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<V>(cache: Cache<V>, cleanup_interval_secs: u64) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let report = cache.cleanup_detailed();

            if report.cleaned > 0 {
                info!(
                    "Expiry sweep: removed {} dead entries ({} evictions total)",
                    report.cleaned, report.evictions
                );
            } else {
                debug!("Expiry sweep: no dead entries found");
            }
        }
    })
}
