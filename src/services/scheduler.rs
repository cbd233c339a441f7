use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::remote::CourseSource;
use crate::services::sequencer::FetchSequencer;
use crate::services::sync_service::{SyncService, SyncStats};

/// Refreshes the course snapshot from the backend on a fixed interval.
pub struct SyncScheduler {
    service: SyncService,
    interval: Duration,
}

impl SyncScheduler {
    pub fn new(
        db: SqlitePool,
        source: Arc<dyn CourseSource>,
        sequencer: Arc<FetchSequencer>,
        interval_secs: u64,
    ) -> Self {
        Self {
            service: SyncService::new(db, source, sequencer),
            interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs forever. Failed rounds are logged and the loop keeps going.
    pub async fn start(self) {
        info!("Starting sync scheduler (interval: {:?})", self.interval);

        loop {
            match self.run_once().await {
                Ok(stats) if stats.committed => {
                    info!(
                        "Scheduled sync #{} done: {} courses, {} schedules",
                        stats.ticket, stats.courses, stats.schedules
                    );
                }
                Ok(stats) => {
                    info!("Scheduled sync #{} was superseded", stats.ticket);
                }
                Err(e) => {
                    warn!("Scheduled sync failed: {:?}", e);
                }
            }

            tokio::time::sleep(self.interval).await;
        }
    }

    pub async fn run_once(&self) -> Result<SyncStats, crate::error::AppError> {
        self.service.sync_all().await
    }
}
