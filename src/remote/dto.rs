use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::clock::ClockTime;
use crate::error::ScheduleError;
use crate::models::{Course, CourseStatus, DayOfWeek, Schedule, ScheduleMode};

/// Response wrapper used by every backend endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub succeeded: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_records: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub tutor_id: Option<String>,
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDto {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub tutor_id: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub course_id: String,
    pub day_of_week: i64,
    pub start_hour: String,
    pub end_hour: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl CourseDto {
    pub fn status(&self) -> Result<CourseStatus, ScheduleError> {
        let raw = self.status.as_deref().unwrap_or("coming");
        CourseStatus::parse(raw).ok_or_else(|| ScheduleError::UnknownValue {
            field: "status",
            value: raw.to_string(),
        })
    }
}

impl ScheduleDto {
    /// Validated conversion; a bad time, day or range is an error.
    pub fn into_schedule(self, fallback_tutor: &str) -> Result<Schedule, ScheduleError> {
        let day = u8::try_from(self.day_of_week)
            .map_err(|_| ScheduleError::DayOutOfRange(u8::MAX))
            .and_then(DayOfWeek::new)?;

        let mode = match self.mode.as_deref() {
            None => ScheduleMode::Offline,
            Some(raw) => ScheduleMode::parse(raw).ok_or_else(|| ScheduleError::UnknownValue {
                field: "mode",
                value: raw.to_string(),
            })?,
        };

        let schedule = Schedule {
            id: self.id,
            tutor_id: self.tutor_id.unwrap_or_else(|| fallback_tutor.to_string()),
            course_id: self.course_id,
            day_of_week: day,
            start_hour: ClockTime::parse(&self.start_hour)?,
            end_hour: ClockTime::parse(&self.end_hour)?,
            mode,
            location: self.location,
            status: self.status,
        };
        schedule.validate()?;
        Ok(schedule)
    }
}

fn value_to_id(v: Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    value_to_id(Value::deserialize(d)?)
        .ok_or_else(|| serde::de::Error::custom("expected string or number id"))
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.and_then(value_to_id))
}

#[derive(Debug, Default)]
pub struct Assembly {
    pub courses: Vec<Course>,
    pub skipped_schedules: usize,
    pub orphan_schedules: usize,
}

/// Attaches schedules to their courses. Invalid or orphaned schedules are
/// counted and left out.
pub fn assemble(courses: Vec<CourseDto>, schedules: Vec<ScheduleDto>) -> Assembly {
    let mut out = Assembly::default();

    for dto in courses {
        let status = match dto.status() {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Skipping course {}: {}", dto.id, e);
                continue;
            }
        };
        out.courses.push(Course {
            id: dto.id,
            tutor_id: dto.tutor_id.unwrap_or_default(),
            title: dto.title.unwrap_or_default(),
            status,
            schedules: Vec::new(),
        });
    }

    for dto in schedules {
        let Some(course) = out.courses.iter_mut().find(|c| c.id == dto.course_id) else {
            tracing::debug!("Schedule {} references unknown course {}", dto.id, dto.course_id);
            out.orphan_schedules += 1;
            continue;
        };
        let id = dto.id.clone();
        match dto.into_schedule(&course.tutor_id) {
            Ok(s) => course.schedules.push(s),
            Err(e) => {
                tracing::warn!("Skipping schedule {}: {}", id, e);
                out.skipped_schedules += 1;
            }
        }
    }

    out
}
