use std::collections::HashMap;

use sqlx::{FromRow, SqlitePool};

use crate::clock::ClockTime;
use crate::error::{AppError, ScheduleError};
use crate::models::{Course, CourseStatus, DayOfWeek, Schedule, ScheduleMode};

#[derive(Debug, FromRow)]
struct CourseRow {
    id: String,
    tutor_id: String,
    title: String,
    status: String,
}

#[derive(Debug, FromRow)]
struct ScheduleRow {
    id: String,
    course_id: String,
    tutor_id: String,
    day_of_week: i64,
    start_minute: i64,
    end_minute: i64,
    mode: String,
    location: Option<String>,
    status: Option<String>,
}

impl ScheduleRow {
    fn into_schedule(self) -> Result<Schedule, ScheduleError> {
        let minutes = |m: i64| {
            u16::try_from(m)
                .map_err(|_| crate::clock::ClockError::OutOfRange(format!("{} minutes", m)))
                .and_then(ClockTime::from_minutes)
        };
        let schedule = Schedule {
            day_of_week: DayOfWeek::new(u8::try_from(self.day_of_week).unwrap_or(u8::MAX))?,
            start_hour: minutes(self.start_minute)?,
            end_hour: minutes(self.end_minute)?,
            mode: ScheduleMode::parse(&self.mode).ok_or_else(|| ScheduleError::UnknownValue {
                field: "mode",
                value: self.mode.clone(),
            })?,
            id: self.id,
            course_id: self.course_id,
            tutor_id: self.tutor_id,
            location: self.location,
            status: self.status,
        };
        schedule.validate()?;
        Ok(schedule)
    }
}

/// Replaces the cached snapshot with `courses` in one transaction.
/// Returns the number of schedules written. Duplicate ids fail the whole
/// write and leave the previous snapshot in place.
pub async fn replace_snapshot(
    db: &SqlitePool,
    courses: &[Course],
    synced_at: &str,
) -> Result<usize, sqlx::Error> {
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM schedules").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM courses").execute(&mut *tx).await?;

    let mut written = 0;
    for (pos, course) in courses.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO courses (id, tutor_id, title, status, position, synced_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&course.id)
        .bind(&course.tutor_id)
        .bind(&course.title)
        .bind(course.status.as_str())
        .bind(pos as i64)
        .bind(synced_at)
        .execute(&mut *tx)
        .await?;

        for (spos, s) in course.schedules.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO schedules
                    (id, course_id, tutor_id, day_of_week, start_minute, end_minute,
                    mode, location, status, position)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(&s.id)
            .bind(&course.id)
            .bind(&s.tutor_id)
            .bind(s.day_of_week.index() as i64)
            .bind(s.start_minutes() as i64)
            .bind(s.end_minutes() as i64)
            .bind(s.mode.as_str())
            .bind(&s.location)
            .bind(&s.status)
            .bind(spos as i64)
            .execute(&mut *tx)
            .await?;
            written += 1;
        }
    }

    tx.commit().await?;
    Ok(written)
}

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, AppError> {
    let courses = sqlx::query_as::<_, CourseRow>(
        "SELECT id, tutor_id, title, status FROM courses ORDER BY position",
    )
    .fetch_all(db)
    .await?;

    let schedules = sqlx::query_as::<_, ScheduleRow>(
        r#"
        SELECT s.id, s.course_id, s.tutor_id, s.day_of_week, s.start_minute, s.end_minute,
               s.mode, s.location, s.status
        FROM schedules s
        JOIN courses c ON c.id = s.course_id
        ORDER BY c.position, s.position
        "#,
    )
    .fetch_all(db)
    .await?;

    attach(courses, schedules)
}

pub async fn fetch_courses_for_tutor(db: &SqlitePool, tutor_id: &str) -> Result<Vec<Course>, AppError> {
    let courses = sqlx::query_as::<_, CourseRow>(
        "SELECT id, tutor_id, title, status FROM courses WHERE tutor_id = ?1 ORDER BY position",
    )
    .bind(tutor_id)
    .fetch_all(db)
    .await?;

    let schedules = sqlx::query_as::<_, ScheduleRow>(
        r#"
        SELECT s.id, s.course_id, s.tutor_id, s.day_of_week, s.start_minute, s.end_minute,
               s.mode, s.location, s.status
        FROM schedules s
        JOIN courses c ON c.id = s.course_id
        WHERE c.tutor_id = ?1
        ORDER BY c.position, s.position
        "#,
    )
    .bind(tutor_id)
    .fetch_all(db)
    .await?;

    attach(courses, schedules)
}

pub async fn last_synced_at(db: &SqlitePool) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<String>>("SELECT MAX(synced_at) FROM courses")
        .fetch_one(db)
        .await
}

fn attach(courses: Vec<CourseRow>, schedules: Vec<ScheduleRow>) -> Result<Vec<Course>, AppError> {
    let mut out: Vec<Course> = Vec::with_capacity(courses.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in courses {
        let status = CourseStatus::parse(&row.status).ok_or_else(|| ScheduleError::UnknownValue {
            field: "status",
            value: row.status.clone(),
        })?;
        index.insert(row.id.clone(), out.len());
        out.push(Course {
            id: row.id,
            tutor_id: row.tutor_id,
            title: row.title,
            status,
            schedules: Vec::new(),
        });
    }

    for row in schedules {
        if let Some(&i) = index.get(&row.course_id) {
            out[i].schedules.push(row.into_schedule()?);
        }
    }

    Ok(out)
}
