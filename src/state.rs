use std::sync::Arc;

use sqlx::SqlitePool;

use crate::calendar::CalendarOptions;
use crate::remote::CourseSource;
use crate::services::{FetchSequencer, SyncService};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub source: Arc<dyn CourseSource>,
    pub sequencer: Arc<FetchSequencer>,
    pub calendar: CalendarOptions,
}

impl AppState {
    pub fn sync_service(&self) -> SyncService {
        SyncService::new(self.db.clone(), self.source.clone(), self.sequencer.clone())
    }
}
