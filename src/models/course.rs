use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::Schedule;
use crate::error::ScheduleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Coming,
    Ongoing,
    Completed,
    #[serde(alias = "cancelled")]
    Canceled,
}

impl CourseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CourseStatus::Coming => "coming",
            CourseStatus::Ongoing => "ongoing",
            CourseStatus::Completed => "completed",
            CourseStatus::Canceled => "canceled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "coming" => Some(CourseStatus::Coming),
            "ongoing" => Some(CourseStatus::Ongoing),
            "completed" => Some(CourseStatus::Completed),
            "canceled" | "cancelled" => Some(CourseStatus::Canceled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    #[serde(default)]
    pub tutor_id: String,
    #[serde(default)]
    pub title: String,
    pub status: CourseStatus,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}

impl Course {
    pub fn is_canceled(&self) -> bool {
        self.status == CourseStatus::Canceled
    }

    /// Binds every schedule to this course. Schedules without a tutor take
    /// the course's.
    pub fn normalize(&mut self) {
        for s in &mut self.schedules {
            s.course_id.clone_from(&self.id);
            if s.tutor_id.is_empty() {
                s.tutor_id.clone_from(&self.tutor_id);
            }
        }
    }
}

/// Course ids are unique in a set, schedule ids unique within their course.
pub fn ensure_unique(courses: &[Course]) -> Result<(), ScheduleError> {
    let mut seen = HashSet::new();
    for course in courses {
        if !seen.insert(course.id.as_str()) {
            return Err(ScheduleError::DuplicateCourse(course.id.clone()));
        }
        let mut ids = HashSet::new();
        for s in &course.schedules {
            if !ids.insert(s.id.as_str()) {
                return Err(ScheduleError::DuplicateSchedule {
                    course: course.id.clone(),
                    id: s.id.clone(),
                });
            }
        }
    }
    Ok(())
}
