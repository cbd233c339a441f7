use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::models::{Course, ensure_unique};
use crate::remote::CourseSource;
use crate::services::sequencer::{FetchSequencer, Ticket};

pub struct SyncService {
    db: SqlitePool,
    source: Arc<dyn CourseSource>,
    sequencer: Arc<FetchSequencer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStats {
    pub ticket: u64,
    pub committed: bool,
    pub courses: usize,
    pub schedules: usize,
    pub synced_at: Option<String>,
}

impl SyncService {
    pub fn new(db: SqlitePool, source: Arc<dyn CourseSource>, sequencer: Arc<FetchSequencer>) -> Self {
        Self {
            db,
            source,
            sequencer,
        }
    }

    /// Pulls the full course set from the backend and replaces the local
    /// snapshot, unless a newer sync finished first.
    pub async fn sync_all(&self) -> Result<SyncStats, AppError> {
        let ticket = self.sequencer.issue();
        info!("Starting sync #{}", ticket.value());

        let courses = self.source.fetch_courses().await?;
        self.store(ticket, courses).await
    }

    /// Replaces the snapshot with a caller-supplied course set.
    pub async fn load(&self, mut courses: Vec<Course>) -> Result<SyncStats, AppError> {
        courses.iter_mut().for_each(Course::normalize);
        let ticket = self.sequencer.issue();
        self.store(ticket, courses).await
    }

    async fn store(&self, ticket: Ticket, courses: Vec<Course>) -> Result<SyncStats, AppError> {
        if let Err(e) = ensure_unique(&courses) {
            warn!("Sync #{} rejected: {}", ticket.value(), e);
            return Err(e.into());
        }

        let synced_at = chrono::Utc::now().to_rfc3339();
        let (db, snapshot, stamp) = (&self.db, courses.as_slice(), synced_at.as_str());

        let written = self
            .sequencer
            .commit_with(ticket, || async move {
                repository::replace_snapshot(db, snapshot, stamp)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        let stats = match written {
            Some(schedules) => {
                info!(
                    "Sync #{} stored {} courses, {} schedules",
                    ticket.value(),
                    courses.len(),
                    schedules
                );
                SyncStats {
                    ticket: ticket.value(),
                    committed: true,
                    courses: courses.len(),
                    schedules,
                    synced_at: Some(synced_at),
                }
            }
            None => {
                warn!("Sync #{} superseded by a newer sync, result discarded", ticket.value());
                SyncStats {
                    ticket: ticket.value(),
                    committed: false,
                    courses: courses.len(),
                    schedules: courses.iter().map(|c| c.schedules.len()).sum(),
                    synced_at: None,
                }
            }
        };
        Ok(stats)
    }
}
