//! Expiry Sweep Task
//!
//! Background task that periodically purges expired entries from an in-process cache.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::InProcessCache;

/// Spawns a background task that periodically purges expired cache entries.
///
/// Reads already filter expired entries, so the sweep only bounds memory use.
///
/// # Arguments
/// * `cache` - Shared cache to sweep
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, used to abort it during shutdown.
pub fn spawn_cleanup_task<K, V>(
    cache: Arc<InProcessCache<K, V>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired().await;

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
