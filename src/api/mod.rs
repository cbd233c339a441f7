use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use tracing::debug;

use crate::calendar::{self, ConflictAnnotation, DayColumn, WeekView};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{Course, DayOfWeek, Schedule};
use crate::services::SyncStats;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarQuery {
    #[serde(default)]
    tutor_id: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses).put(load_courses))
        .route("/conflicts", post(check_conflicts))
        .route("/calendar/week", get(week_calendar).post(week_calendar_for))
        .route("/calendar/day/{day}", get(day_calendar))
        .route("/sync", post(sync_now))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn snapshot(state: &AppState, tutor_id: Option<&str>) -> Result<Vec<Course>, AppError> {
    match tutor_id {
        Some(id) => repository::fetch_courses_for_tutor(&state.db, id).await,
        None => repository::fetch_courses(&state.db).await,
    }
}

async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<CalendarQuery>,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = snapshot(&state, params.tutor_id.as_deref()).await?;
    Ok(Json(courses))
}

async fn load_courses(
    State(state): State<AppState>,
    Json(courses): Json<Vec<Course>>,
) -> Result<Json<SyncStats>, AppError> {
    let stats = state.sync_service().load(courses).await?;
    Ok(Json(stats))
}

async fn check_conflicts(Json(schedules): Json<Vec<Schedule>>) -> Json<Vec<ConflictAnnotation>> {
    let annotations = calendar::detect_conflicts(&schedules);
    debug!(
        "Checked {} schedules, {} in conflict",
        schedules.len(),
        annotations.iter().filter(|a| a.has_conflict).count()
    );
    Json(annotations)
}

async fn week_calendar(
    State(state): State<AppState>,
    Query(params): Query<CalendarQuery>,
) -> Result<Json<WeekView>, AppError> {
    let courses = snapshot(&state, params.tutor_id.as_deref()).await?;
    Ok(Json(calendar::week_view(&courses, &state.calendar)))
}

async fn week_calendar_for(
    State(state): State<AppState>,
    Json(courses): Json<Vec<Course>>,
) -> Json<WeekView> {
    Json(calendar::week_view(&courses, &state.calendar))
}

async fn day_calendar(
    State(state): State<AppState>,
    Path(day): Path<u8>,
    Query(params): Query<CalendarQuery>,
) -> Result<Json<DayColumn>, AppError> {
    let day = DayOfWeek::new(day)?;
    let courses = snapshot(&state, params.tutor_id.as_deref()).await?;
    Ok(Json(calendar::day_view(&courses, day, &state.calendar)))
}

async fn sync_now(State(state): State<AppState>) -> Result<Json<SyncStats>, AppError> {
    if !state.source.is_configured() {
        return Err(AppError::BadRequest("no backend configured to sync from".to_string()));
    }
    let stats = state.sync_service().sync_all().await?;
    Ok(Json(stats))
}
