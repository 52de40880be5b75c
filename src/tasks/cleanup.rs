//! Expiry Cleanup Task
//!
//! Background task that periodically sweeps expired cache entries and stale
//! rate limit windows.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;
use crate::ratelimit::RateLimiter;

/// Spawns a background task that sweeps the cache and the rate limiter.
///
/// Lookups already expire entries lazily; the sweep reclaims entries that
/// are never looked up again.
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
pub fn spawn_cleanup_task(
    cache: SharedCache,
    limiter: RateLimiter,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let expired = cache.cleanup_expired().await;
            let windows = limiter.prune().await;
            let entries = cache.len().await;
            let memory_bytes = cache.memory_bytes().await;
            let tracked_windows = limiter.tracked().await;

            if expired > 0 || windows > 0 {
                info!(
                    expired,
                    windows,
                    entries,
                    memory_bytes,
                    tracked_windows,
                    "cleanup removed stale state"
                );
            } else {
                debug!(entries, memory_bytes, tracked_windows, "cleanup found nothing to remove");
            }
        }
    })
}
