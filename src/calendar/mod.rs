pub mod binning;
pub mod conflict;

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Course, DayOfWeek, Schedule};

pub use binning::{Placement, SlotGrid, bin_by_slot, position};
pub use conflict::{Column, ConflictAnnotation, active_schedules, detect_conflicts, overlaps};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarOptions {
    pub grid: SlotGrid,
    pub hour_height_px: f64,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            grid: SlotGrid::default(),
            hour_height_px: binning::DEFAULT_HOUR_HEIGHT_PX,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub schedule: Schedule,
    pub course_title: String,
    pub has_conflict: bool,
    pub conflicting_ids: Vec<String>,
    pub column: Column,
    pub placement: Placement,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRow {
    pub hour: u8,
    pub label: String,
    pub schedule_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayColumn {
    pub day: DayOfWeek,
    pub name: &'static str,
    pub entries: Vec<CalendarEntry>,
    pub slots: Vec<SlotRow>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekView {
    pub grid: SlotGrid,
    pub hour_height_px: f64,
    pub conflict_count: usize,
    pub days: Vec<DayColumn>,
}

/// Lays out the whole week: every active schedule annotated, placed and
/// binned into its day's hourly rows.
pub fn week_view(courses: &[Course], opts: &CalendarOptions) -> WeekView {
    let schedules = active_schedules(courses);
    let mut built = build_days(courses, &schedules, opts);
    let conflict_count = built
        .iter()
        .flat_map(|d| d.entries.iter())
        .filter(|e| e.has_conflict)
        .count();

    // every weekday gets a column, even an empty one
    let days = DayOfWeek::ALL
        .iter()
        .map(|&day| match built.iter().position(|d| d.day == day) {
            Some(i) => built.swap_remove(i),
            None => empty_day(day, &opts.grid),
        })
        .collect();

    WeekView {
        grid: opts.grid,
        hour_height_px: opts.hour_height_px,
        conflict_count,
        days,
    }
}

pub fn day_view(courses: &[Course], day: DayOfWeek, opts: &CalendarOptions) -> DayColumn {
    let schedules: Vec<Schedule> = active_schedules(courses)
        .into_iter()
        .filter(|s| s.day_of_week == day)
        .collect();

    build_days(courses, &schedules, opts)
        .into_iter()
        .next()
        .unwrap_or_else(|| empty_day(day, &opts.grid))
}

fn build_days(courses: &[Course], schedules: &[Schedule], opts: &CalendarOptions) -> Vec<DayColumn> {
    let titles: HashMap<&str, &str> = courses
        .iter()
        .map(|c| (c.id.as_str(), c.title.as_str()))
        .collect();
    let annotations = detect_conflicts(schedules);
    let table = bin_by_slot(&opts.grid, schedules);

    let mut days: Vec<DayColumn> = Vec::new();
    for i in conflict::start_order(schedules) {
        let s = &schedules[i];
        let ann = &annotations[i];
        let entry = CalendarEntry {
            schedule: s.clone(),
            course_title: titles.get(s.course_id.as_str()).copied().unwrap_or_default().to_string(),
            has_conflict: ann.has_conflict,
            conflicting_ids: ann.conflicting_ids.clone(),
            column: ann.column,
            placement: position(s, opts.hour_height_px),
        };

        match days.iter_mut().find(|d| d.day == s.day_of_week) {
            Some(d) => d.entries.push(entry),
            None => {
                let mut d = empty_day(s.day_of_week, &opts.grid);
                d.entries.push(entry);
                days.push(d);
            }
        }
    }

    for d in days.iter_mut() {
        if let Some(rows) = table.get(&d.day) {
            for slot in d.slots.iter_mut() {
                if let Some(ids) = rows.get(&slot.hour) {
                    slot.schedule_ids = ids.iter().map(|&i| schedules[i].id.clone()).collect();
                }
            }
        }
    }

    days
}

fn empty_day(day: DayOfWeek, grid: &SlotGrid) -> DayColumn {
    DayColumn {
        day,
        name: day.name(),
        entries: Vec::new(),
        slots: grid
            .hours()
            .map(|h| SlotRow {
                hour: h,
                label: format!("{:02}:00 - {:02}:00", h, h + 1),
                schedule_ids: Vec::new(),
            })
            .collect(),
    }
}
