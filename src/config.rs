use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::calendar::binning::{DEFAULT_END_HOUR, DEFAULT_HOUR_HEIGHT_PX, DEFAULT_START_HOUR};
use crate::calendar::{CalendarOptions, SlotGrid};
use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub page_size: u32,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub sync_interval_secs: u64,
    pub backend: Option<BackendConfig>,
    pub calendar: CalendarOptions,
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://tutor_calendar.db?mode=rwc".to_string());
        let bind_addr = parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?;
        let sync_interval_secs = parse_or(&lookup, "SYNC_INTERVAL_SECS", 300u64)?;

        let backend = match lookup("BACKEND_BASE_URL").filter(|s| !s.trim().is_empty()) {
            Some(base_url) => Some(BackendConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                api_token: lookup("BACKEND_TOKEN").filter(|s| !s.is_empty()),
                page_size: parse_or(&lookup, "BACKEND_PAGE_SIZE", 100u32)?,
            }),
            None => None,
        };

        let start_hour = parse_or(&lookup, "CALENDAR_START_HOUR", DEFAULT_START_HOUR)?;
        let end_hour = parse_or(&lookup, "CALENDAR_END_HOUR", DEFAULT_END_HOUR)?;
        let grid = SlotGrid::new(start_hour, end_hour)
            .map_err(|e| AppError::Config(e.to_string()))?;

        let hour_height_px = parse_or(&lookup, "HOUR_HEIGHT_PX", DEFAULT_HOUR_HEIGHT_PX)?;
        if !(hour_height_px.is_finite() && hour_height_px > 0.0) {
            return Err(AppError::Config(format!(
                "HOUR_HEIGHT_PX must be positive, got {}",
                hour_height_px
            )));
        }

        Ok(Self {
            database_url,
            bind_addr,
            sync_interval_secs,
            backend,
            calendar: CalendarOptions {
                grid,
                hour_height_px,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::Config(format!("{} is invalid ({:?}): {}", key, raw, e))),
        None => Ok(default),
    }
}
