use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tutor_calendar::clock::ClockTime;
use tutor_calendar::db::{self, repository};
use tutor_calendar::error::AppError;
use tutor_calendar::models::{Course, CourseStatus, DayOfWeek, Schedule, ScheduleMode};
use tutor_calendar::remote::CourseSource;
use tutor_calendar::services::{FetchSequencer, SyncScheduler, SyncService};

struct FixedSource {
    courses: Vec<Course>,
    delay: Duration,
    calls: AtomicUsize,
}

impl FixedSource {
    fn new(courses: Vec<Course>, delay_ms: u64) -> Self {
        Self {
            courses,
            delay: Duration::from_millis(delay_ms),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CourseSource for FixedSource {
    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(self.courses.clone())
    }
}

struct FailingSource;

#[async_trait]
impl CourseSource for FailingSource {
    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError> {
        Err(AppError::Remote("backend unavailable".to_string()))
    }
}

fn course(id: &str, tutor: &str, status: CourseStatus, day: u8, start: &str, end: &str) -> Course {
    Course {
        id: id.to_string(),
        tutor_id: tutor.to_string(),
        title: format!("Course {}", id),
        status,
        schedules: vec![Schedule {
            id: format!("{}-s1", id),
            tutor_id: tutor.to_string(),
            course_id: id.to_string(),
            day_of_week: DayOfWeek::new(day).unwrap(),
            start_hour: ClockTime::parse(start).unwrap(),
            end_hour: ClockTime::parse(end).unwrap(),
            mode: ScheduleMode::Online,
            location: Some("Room 1".to_string()),
            status: None,
        }],
    }
}

#[tokio::test]
async fn sync_stores_snapshot_in_order() {
    let pool = db::connect_in_memory().await.expect("Failed to create database");
    let source = Arc::new(FixedSource::new(
        vec![
            course("b", "t1", CourseStatus::Ongoing, 1, "09:00", "10:00"),
            course("a", "t2", CourseStatus::Canceled, 2, "14:00", "15:30"),
        ],
        0,
    ));
    let service = SyncService::new(pool.clone(), source, Arc::new(FetchSequencer::new()));

    let stats = service.sync_all().await.expect("sync failed");
    assert!(stats.committed);
    assert_eq!(stats.courses, 2);
    assert_eq!(stats.schedules, 2);

    let stored = repository::fetch_courses(&pool).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].id, "b");
    assert_eq!(stored[1].status, CourseStatus::Canceled);
    assert_eq!(stored[1].schedules[0].start_hour, ClockTime::parse("14:00").unwrap());
    assert_eq!(stored[1].schedules[0].location.as_deref(), Some("Room 1"));

    let mine = repository::fetch_courses_for_tutor(&pool, "t2").await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, "a");

    assert!(repository::last_synced_at(&pool).await.unwrap().is_some());
}

#[tokio::test]
async fn empty_store_has_no_sync_time() {
    let pool = db::connect_in_memory().await.expect("Failed to create database");
    assert_eq!(repository::last_synced_at(&pool).await.unwrap(), None);
    assert!(repository::fetch_courses(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn slow_stale_sync_does_not_overwrite_newer_one() {
    let pool = db::connect_in_memory().await.expect("Failed to create database");
    let sequencer = Arc::new(FetchSequencer::new());

    let stale = SyncService::new(
        pool.clone(),
        Arc::new(FixedSource::new(vec![course("old", "t1", CourseStatus::Ongoing, 1, "08:00", "09:00")], 200)),
        sequencer.clone(),
    );
    let fresh = SyncService::new(
        pool.clone(),
        Arc::new(FixedSource::new(vec![course("new", "t1", CourseStatus::Ongoing, 1, "10:00", "11:00")], 0)),
        sequencer.clone(),
    );

    // the stale fetch is issued first but resolves last
    let (stale_stats, fresh_stats) = tokio::join!(stale.sync_all(), fresh.sync_all());
    let stale_stats = stale_stats.unwrap();
    let fresh_stats = fresh_stats.unwrap();

    assert!(stale_stats.ticket < fresh_stats.ticket);
    assert!(fresh_stats.committed);
    assert!(!stale_stats.committed);

    let stored = repository::fetch_courses(&pool).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, "new");
}

#[tokio::test]
async fn failed_sync_keeps_previous_snapshot() {
    let pool = db::connect_in_memory().await.expect("Failed to create database");
    let sequencer = Arc::new(FetchSequencer::new());

    SyncService::new(pool.clone(), Arc::new(FixedSource::new(vec![course("a", "t1", CourseStatus::Coming, 3, "09:00", "10:00")], 0)), sequencer.clone())
        .sync_all()
        .await
        .unwrap();

    let result = SyncService::new(pool.clone(), Arc::new(FailingSource), sequencer)
        .sync_all()
        .await;
    assert!(matches!(result, Err(AppError::Remote(_))));

    let stored = repository::fetch_courses(&pool).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn scheduler_runs_repeatedly() {
    let pool = db::connect_in_memory().await.expect("Failed to create database");
    let source = Arc::new(FixedSource::new(vec![course("a", "t1", CourseStatus::Ongoing, 5, "16:00", "17:00")], 0));

    let scheduler = SyncScheduler::new(pool.clone(), source.clone(), Arc::new(FetchSequencer::new()), 1);
    assert_eq!(scheduler.interval(), Duration::from_secs(1));

    let task = tokio::spawn(scheduler.start());
    tokio::time::sleep(Duration::from_millis(1500)).await;
    task.abort();

    assert!(source.calls.load(Ordering::SeqCst) >= 2);
    assert_eq!(repository::fetch_courses(&pool).await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_rows_fail_the_whole_write() {
    let pool = db::connect_in_memory().await.expect("Failed to create database");
    let first = vec![course("a", "t1", CourseStatus::Ongoing, 1, "09:00", "10:00")];
    repository::replace_snapshot(&pool, &first, "2026-01-01T00:00:00Z").await.unwrap();

    let twice = vec![
        course("b", "t1", CourseStatus::Ongoing, 2, "09:00", "10:00"),
        course("b", "t2", CourseStatus::Coming, 3, "11:00", "12:00"),
    ];
    let result = repository::replace_snapshot(&pool, &twice, "2026-01-02T00:00:00Z").await;
    assert!(result.is_err());

    let stored = repository::fetch_courses(&pool).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, "a");
}

#[tokio::test]
async fn duplicate_backend_courses_are_rejected() {
    let pool = db::connect_in_memory().await.expect("Failed to create database");
    let source = Arc::new(FixedSource::new(
        vec![
            course("a", "t1", CourseStatus::Ongoing, 1, "09:00", "10:00"),
            course("a", "t1", CourseStatus::Ongoing, 2, "09:00", "10:00"),
        ],
        0,
    ));
    let result = SyncService::new(pool.clone(), source, Arc::new(FetchSequencer::new()))
        .sync_all()
        .await;

    assert!(matches!(result, Err(AppError::Schedule(_))));
    assert!(repository::fetch_courses(&pool).await.unwrap().is_empty());
}
