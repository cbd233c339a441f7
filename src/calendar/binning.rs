use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ScheduleError;
use crate::models::{DayOfWeek, Schedule};

use super::conflict::start_order;

pub const DEFAULT_START_HOUR: u8 = 7;
pub const DEFAULT_END_HOUR: u8 = 22;
pub const DEFAULT_HOUR_HEIGHT_PX: f64 = 60.0;

/// Hourly rows `[h:00, h+1:00)` for `h` in `start_hour..end_hour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotGrid {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
        }
    }
}

impl SlotGrid {
    pub fn new(start_hour: u8, end_hour: u8) -> Result<Self, ScheduleError> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(ScheduleError::InvalidGrid {
                start: start_hour,
                end: end_hour,
            });
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    pub fn hours(&self) -> impl Iterator<Item = u8> {
        self.start_hour..self.end_hour
    }

    /// Every row of the grid that the schedule's interval overlaps.
    pub fn slots_for(&self, schedule: &Schedule) -> Vec<u8> {
        let (start, end) = (schedule.start_minutes(), schedule.end_minutes());
        self.hours()
            .filter(|&h| {
                let row_start = h as u16 * 60;
                start < row_start + 60 && row_start < end
            })
            .collect()
    }
}

/// Schedule indices per day and hour row, each row in start order.
pub type SlotTable = BTreeMap<DayOfWeek, BTreeMap<u8, Vec<usize>>>;

pub fn bin_by_slot(grid: &SlotGrid, schedules: &[Schedule]) -> SlotTable {
    let mut table = SlotTable::new();
    for i in start_order(schedules) {
        let s = &schedules[i];
        for hour in grid.slots_for(s) {
            table
                .entry(s.day_of_week)
                .or_default()
                .entry(hour)
                .or_default()
                .push(i);
        }
    }
    table
}

/// Absolute placement relative to the row of the starting hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub row_hour: u8,
    pub top_px: f64,
    pub height_px: f64,
}

pub fn position(schedule: &Schedule, hour_height_px: f64) -> Placement {
    let start_minute = schedule.start_hour.minute() as f64;
    let duration_hours = schedule.duration_minutes() as f64 / 60.0;
    Placement {
        row_hour: schedule.start_hour.hour(),
        top_px: start_minute / 60.0 * hour_height_px,
        height_px: duration_hours * hour_height_px,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ClockTime;
    use crate::models::ScheduleMode;

    fn sched(id: &str, day: u8, start: &str, end: &str) -> Schedule {
        Schedule {
            id: id.to_string(),
            tutor_id: "t1".to_string(),
            course_id: "c1".to_string(),
            day_of_week: DayOfWeek::new(day).unwrap(),
            start_hour: ClockTime::parse(start).unwrap(),
            end_hour: ClockTime::parse(end).unwrap(),
            mode: ScheduleMode::Offline,
            location: None,
            status: None,
        }
    }

    #[test]
    fn default_grid_covers_seven_to_ten() {
        let grid = SlotGrid::default();
        let hours: Vec<u8> = grid.hours().collect();
        assert_eq!(hours.first(), Some(&7));
        assert_eq!(hours.last(), Some(&21));
        assert_eq!(hours.len(), 15);
    }

    #[test]
    fn rejects_empty_grid() {
        assert!(SlotGrid::new(10, 10).is_err());
        assert!(SlotGrid::new(8, 25).is_err());
        assert!(SlotGrid::new(0, 24).is_ok());
    }

    #[test]
    fn spanning_schedule_lands_in_every_row() {
        let grid = SlotGrid::default();
        assert_eq!(grid.slots_for(&sched("a", 1, "09:00", "11:00")), vec![9, 10]);
        assert_eq!(grid.slots_for(&sched("b", 1, "09:30", "10:15")), vec![9, 10]);
        assert_eq!(grid.slots_for(&sched("c", 1, "10:00", "11:00")), vec![10]);
    }

    #[test]
    fn rows_outside_grid_are_dropped() {
        let grid = SlotGrid::default();
        assert_eq!(grid.slots_for(&sched("a", 1, "05:00", "07:30")), vec![7]);
        assert!(grid.slots_for(&sched("b", 1, "22:00", "23:00")).is_empty());
    }

    #[test]
    fn bins_per_day_in_start_order() {
        let items = [
            sched("late", 1, "09:30", "10:00"),
            sched("early", 1, "09:00", "11:00"),
            sched("other", 5, "09:00", "10:00"),
        ];
        let table = bin_by_slot(&SlotGrid::default(), &items);
        let monday = &table[&DayOfWeek::new(1).unwrap()];
        assert_eq!(monday[&9u8], vec![1, 0]);
        assert_eq!(monday[&10u8], vec![1]);
        assert_eq!(table[&DayOfWeek::new(5).unwrap()][&9u8], vec![2]);
    }

    #[test]
    fn places_relative_to_start_row() {
        let p = position(&sched("a", 1, "09:30", "11:00"), DEFAULT_HOUR_HEIGHT_PX);
        assert_eq!(p.row_hour, 9);
        assert_eq!(p.top_px, 30.0);
        assert_eq!(p.height_px, 90.0);

        let p = position(&sched("b", 1, "14:15", "15:00"), 120.0);
        assert_eq!(p.top_px, 30.0);
        assert_eq!(p.height_px, 90.0);
    }
}
