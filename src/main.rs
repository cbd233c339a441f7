use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tutor_calendar::api::router;
use tutor_calendar::config::AppConfig;
use tutor_calendar::db;
use tutor_calendar::remote::{CourseSource, HttpCourseSource, NoopCourseSource};
use tutor_calendar::services::{FetchSequencer, SyncScheduler};
use tutor_calendar::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "tutor_calendar=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;
    let pool = db::connect(&config.database_url).await?;
    let sequencer = Arc::new(FetchSequencer::new());

    let source: Arc<dyn CourseSource> = match config.backend.clone() {
        Some(backend) => {
            info!("Using backend at {}", backend.base_url);
            let source: Arc<dyn CourseSource> = Arc::new(HttpCourseSource::new(backend)?);
            let scheduler = SyncScheduler::new(
                pool.clone(),
                source.clone(),
                sequencer.clone(),
                config.sync_interval_secs,
            );
            tokio::spawn(scheduler.start());
            source
        }
        None => {
            warn!("BACKEND_BASE_URL not set, courses must be loaded with PUT /courses");
            Arc::new(NoopCourseSource)
        }
    };

    let state = AppState {
        db: pool,
        source,
        sequencer,
        calendar: config.calendar,
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
