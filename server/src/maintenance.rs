//! Background housekeeping for the job store.

use lookout_db::JobStore;
use std::time::Duration;
use tokio::task::JoinHandle;

/// How often expired jobs are purged.
pub const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Purge expired jobs every `every`, starting immediately.
///
/// Failures are logged and retried on the next tick.
pub fn spawn_retention_task(store: JobStore, retention: Duration, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = store.purge_expired(retention).await {
                tracing::warn!(error = %e, "failed to purge expired jobs");
            }
        }
    })
}
