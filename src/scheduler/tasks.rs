use std::sync::Arc;

use tracing::info;

use crate::bot::DispatchStats;
use crate::scheduler::Scheduler;

/// Log the dispatch counters at the top of every hour.
pub async fn register_heartbeat(
    scheduler: &Scheduler,
    stats: Arc<DispatchStats>,
) -> anyhow::Result<()> {
    scheduler
        .add_cron_job("0 0 * * * *", "heartbeat", move || {
            let stats = stats.clone();
            Box::pin(async move {
                info!("Heartbeat: bot is alive ({})", stats.summary());
            })
        })
        .await?;

    Ok(())
}
