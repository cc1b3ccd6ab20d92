//! Background purge of expired short-term records.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use super::traits::ShortTermStore;

pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;

/// Spawn a task that calls [`ShortTermStore::purge_expired`] every `every`.
///
/// The returned handle can be used to abort the task.
pub fn spawn_cleanup_task(
    store: Arc<dyn ShortTermStore>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);

        // Skip the first immediate tick
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match store.purge_expired().await {
                Ok(0) => tracing::debug!("Session cleanup: no expired sessions"),
                Ok(count) => tracing::info!(purged = count, "Session cleanup completed"),
                Err(e) => tracing::warn!(error = %e, "Session cleanup failed"),
            }
        }
    })
}
