use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::ClockTime;
use crate::error::ScheduleError;

/// Day of week, 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek(0),
        DayOfWeek(1),
        DayOfWeek(2),
        DayOfWeek(3),
        DayOfWeek(4),
        DayOfWeek(5),
        DayOfWeek(6),
    ];

    pub fn new(day: u8) -> Result<Self, ScheduleError> {
        if day > 6 {
            return Err(ScheduleError::DayOutOfRange(day));
        }
        Ok(Self(day))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "Sunday",
            1 => "Monday",
            2 => "Tuesday",
            3 => "Wednesday",
            4 => "Thursday",
            5 => "Friday",
            _ => "Saturday",
        }
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = ScheduleError;

    fn try_from(day: u8) -> Result<Self, Self::Error> {
        Self::new(day)
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> u8 {
        day.0
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    Online,
    #[serde(alias = "in-person", alias = "inperson")]
    Offline,
    Hybrid,
}

impl ScheduleMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleMode::Online => "online",
            ScheduleMode::Offline => "offline",
            ScheduleMode::Hybrid => "hybrid",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "online" => Some(ScheduleMode::Online),
            "offline" | "in-person" | "inperson" => Some(ScheduleMode::Offline),
            "hybrid" => Some(ScheduleMode::Hybrid),
            _ => None,
        }
    }
}

/// A recurring weekly slot of a course. `end_hour` is always after `start_hour`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ScheduleWire")]
pub struct Schedule {
    pub id: String,
    pub tutor_id: String,
    pub course_id: String,
    pub day_of_week: DayOfWeek,
    pub start_hour: ClockTime,
    pub end_hour: ClockTime,
    pub mode: ScheduleMode,
    pub location: Option<String>,
    pub status: Option<String>,
}

impl Schedule {
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.end_hour <= self.start_hour {
            return Err(ScheduleError::InvalidRange {
                id: self.id.clone(),
                start: self.start_hour,
                end: self.end_hour,
            });
        }
        Ok(())
    }

    pub fn start_minutes(&self) -> u16 {
        self.start_hour.minutes()
    }

    pub fn end_minutes(&self) -> u16 {
        self.end_hour.minutes()
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end_minutes().saturating_sub(self.start_minutes())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleWire {
    #[serde(default)]
    id: String,
    #[serde(default)]
    tutor_id: String,
    course_id: String,
    day_of_week: DayOfWeek,
    start_hour: ClockTime,
    end_hour: ClockTime,
    mode: ScheduleMode,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl TryFrom<ScheduleWire> for Schedule {
    type Error = ScheduleError;

    fn try_from(w: ScheduleWire) -> Result<Self, Self::Error> {
        // drafts that were never saved arrive without an id
        let id = if w.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            w.id
        };
        let schedule = Schedule {
            id,
            tutor_id: w.tutor_id,
            course_id: w.course_id,
            day_of_week: w.day_of_week,
            start_hour: w.start_hour,
            end_hour: w.end_hour,
            mode: w.mode,
            location: w.location,
            status: w.status,
        };
        schedule.validate()?;
        Ok(schedule)
    }
}
