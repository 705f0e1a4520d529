//! Token Cache Purge Task
//!
//! Background task that periodically drops expired token cache entries.
//! Expiry is already enforced on read; this only bounds memory held by
//! tokens nobody asks about again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TokenCache;

/// Spawns a task that purges expired entries from `cache` every
/// `cleanup_interval_secs` seconds.
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = TokenCache::new(20_000, Duration::from_secs(300));
/// let handle = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: TokenCache, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            "Starting token cache purge task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired().await;
            if removed > 0 {
                info!(removed, "Token cache purge: removed expired entries");
            } else {
                debug!("Token cache purge: no expired entries found");
            }
        }
    })
}
