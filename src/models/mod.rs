pub mod course;
pub mod schedule;

pub use course::{Course, CourseStatus, ensure_unique};
pub use schedule::{DayOfWeek, Schedule, ScheduleMode};
