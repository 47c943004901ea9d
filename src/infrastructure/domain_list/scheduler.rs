//! Periodic blocklist refresh

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::domain::DomainListService;

/// Spawns a task that refreshes the blocklist every `period`
///
/// The first refresh happens one full period after spawning. Failures are
/// logged and retried on the next tick.
pub fn spawn_refresh_task(
    domain_list: Arc<dyn DomainListService>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        info!("Blocklist refresh scheduled every {}s", period.as_secs());

        loop {
            ticker.tick().await;
            if let Err(e) = domain_list.refresh().await {
                error!("Scheduled blocklist refresh failed: {}", e);
            }
        }
    })
}
