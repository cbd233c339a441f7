use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Course, DayOfWeek, Schedule};

/// Share of the day column handed out to overlapping events, in percent.
pub const COLUMN_SPAN_PERCENT: f64 = 95.0;

/// Horizontal slot of an event inside its day column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub count: usize,
    pub position: usize,
    pub width: f64,
    pub left: f64,
}

impl Column {
    fn new(count: usize, position: usize) -> Self {
        let width = COLUMN_SPAN_PERCENT / count as f64;
        Self {
            count,
            position,
            width,
            left: position as f64 * width,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictAnnotation {
    pub index: usize,
    pub schedule_id: String,
    pub has_conflict: bool,
    pub conflicts_with: Vec<usize>,
    pub conflicting_ids: Vec<String>,
    pub column: Column,
}

/// Half-open interval overlap on the same day: touching boundaries do not overlap.
pub fn overlaps(a: &Schedule, b: &Schedule) -> bool {
    a.day_of_week == b.day_of_week
        && a.start_minutes() < b.end_minutes()
        && b.start_minutes() < a.end_minutes()
}

/// Schedules of every course that is not canceled, in course order.
pub fn active_schedules(courses: &[Course]) -> Vec<Schedule> {
    courses
        .iter()
        .filter(|c| !c.is_canceled())
        .flat_map(|c| c.schedules.iter().cloned())
        .collect()
}

/// Indices sorted by start time. Equal starts keep input order.
pub fn start_order(schedules: &[Schedule]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..schedules.len()).collect();
    order.sort_by_key(|&i| schedules[i].start_hour);
    order
}

/// Same entry, or the same schedule of the same course listed twice.
/// Ids are only unique within a course.
fn same_schedule(schedules: &[Schedule], i: usize, j: usize) -> bool {
    let (a, b) = (&schedules[i], &schedules[j]);
    i == j || (!a.id.is_empty() && a.id == b.id && a.course_id == b.course_id)
}

/// Annotates every schedule with the schedules it overlaps on its day and
/// the column it takes when rendered side by side with them.
pub fn detect_conflicts(schedules: &[Schedule]) -> Vec<ConflictAnnotation> {
    let order = start_order(schedules);
    let mut rank = vec![0usize; schedules.len()];
    for (pos, &i) in order.iter().enumerate() {
        rank[i] = pos;
    }

    let mut by_day: BTreeMap<DayOfWeek, Vec<usize>> = BTreeMap::new();
    for (i, s) in schedules.iter().enumerate() {
        by_day.entry(s.day_of_week).or_default().push(i);
    }

    let mut conflicts: Vec<Vec<usize>> = vec![Vec::new(); schedules.len()];
    for members in by_day.values() {
        for (a, &i) in members.iter().enumerate() {
            for &j in &members[a + 1..] {
                if same_schedule(schedules, i, j) {
                    continue;
                }
                if overlaps(&schedules[i], &schedules[j]) {
                    conflicts[i].push(j);
                    conflicts[j].push(i);
                }
            }
        }
    }

    schedules
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mut with = std::mem::take(&mut conflicts[i]);
            with.sort_unstable();

            // The group is this schedule plus its direct conflicts, so in a chain
            // A-B-C where A and C do not overlap, B is split three ways and A, C
            // two ways, and neighbouring columns can overlap on screen.
            let position = with.iter().filter(|&&j| rank[j] < rank[i]).count();
            let column = Column::new(with.len() + 1, position);

            ConflictAnnotation {
                index: i,
                schedule_id: s.id.clone(),
                has_conflict: !with.is_empty(),
                conflicting_ids: with.iter().map(|&j| schedules[j].id.clone()).collect(),
                conflicts_with: with,
                column,
            }
        })
        .collect()
}
