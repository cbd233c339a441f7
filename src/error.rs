use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::clock::{ClockError, ClockTime};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("schedule {id}: end {end} is not after start {start}")]
    InvalidRange {
        id: String,
        start: ClockTime,
        end: ClockTime,
    },

    #[error("day of week {0} out of range 0-6")]
    DayOutOfRange(u8),

    #[error("calendar grid {start}:00-{end}:00 is empty or exceeds the day")]
    InvalidGrid { start: u8, end: u8 },

    #[error("course {0} appears more than once")]
    DuplicateCourse(String),

    #[error("course {course} lists schedule {id} more than once")]
    DuplicateSchedule { course: String, id: String },

    #[error("unknown {field} value {value:?}")]
    UnknownValue { field: &'static str, value: String },

    #[error(transparent)]
    Clock(#[from] ClockError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Backend error: {0}")]
    Remote(String),

    #[error("Invalid schedule: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Invalid time: {0}")]
    Clock(#[from] ClockError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Remote(e.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Schedule(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Clock(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Remote(msg) => {
                error!("backend error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::Config(msg) => {
                error!("configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
