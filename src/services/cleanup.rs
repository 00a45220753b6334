use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};

use crate::bot::gateway::MessagingGateway;
use crate::database::repository::{LotteryRepository, ParticipantRepository};
use crate::lottery::LotteryService;
use crate::utils::logging::log_system_event;

/// Daily at 04:00 UTC
pub const CLEANUP_SCHEDULE: &str = "0 0 4 * * *";

/// Periodically removes finished lotteries and their participants once the
/// retention window has passed.
pub struct CleanupService<S, G> {
    service: Arc<LotteryService<S, G>>,
    retention_days: i64,
    scheduler: JobScheduler,
}

impl<S, G> CleanupService<S, G>
where
    S: LotteryRepository + ParticipantRepository + 'static,
    G: MessagingGateway,
{
    pub async fn new(
        service: Arc<LotteryService<S, G>>,
        retention_days: i64,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            service,
            retention_days,
            scheduler,
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let service = self.service.clone();
        let retention_days = self.retention_days;

        let cleanup_job = Job::new_async(CLEANUP_SCHEDULE, move |_uuid, _l| {
            let service = service.clone();
            Box::pin(async move {
                if let Err(e) = purge(&service, retention_days).await {
                    tracing::error!("Failed to purge finished lotteries: {}", e);
                }
            })
        })?;

        self.scheduler.add(cleanup_job).await?;
        self.scheduler.start().await?;

        tracing::info!(
            "Cleanup service started - purging lotteries finished more than {} days ago, daily at 04:00 UTC",
            self.retention_days
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    /// Runs one purge immediately; returns the number of lotteries removed.
    pub async fn run_now(&self) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        purge(&self.service, self.retention_days).await
    }
}

async fn purge<S, G>(
    service: &LotteryService<S, G>,
    retention_days: i64,
) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>
where
    S: LotteryRepository + ParticipantRepository,
    G: MessagingGateway,
{
    let removed = service
        .purge_finished(chrono::Duration::days(retention_days))
        .await?;
    if removed > 0 {
        log_system_event("Finished lotteries purged", Some(&format!("{removed} removed")));
    }
    Ok(removed)
}
