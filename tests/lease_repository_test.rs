//! Cross-process lease behavior against a shared SQLite file.

mod helpers;

use atlas_resolver::adapters::sqlite::SqliteWorkerTaskRepository;
use atlas_resolver::domain::models::WorkerTaskStatus;
use atlas_resolver::domain::ports::{ManualClock, WorkerTaskRepository};
use chrono::{Duration, TimeZone, Utc};
use helpers::database::{setup_test_db, SharedTestDb};
use std::sync::Arc;

const WORK: &str = "AtlasChallengeResolution";

#[tokio::test]
async fn test_second_begin_is_rejected_with_in_progress_message() {
    let repo = SqliteWorkerTaskRepository::new(setup_test_db().await);

    repo.try_to_begin_work("X", Duration::seconds(10)).await.unwrap();
    let err = repo
        .try_to_begin_work("X", Duration::seconds(10))
        .await
        .unwrap_err();

    assert!(err.is_work_in_progress());
    assert!(err
        .to_string()
        .starts_with("Work of this type is currently in progress"));
}

#[tokio::test]
async fn test_racing_processes_get_exactly_one_lease() {
    let db = SharedTestDb::new();
    let repos: Vec<Arc<SqliteWorkerTaskRepository>> = {
        let mut repos = Vec::new();
        for _ in 0..4 {
            repos.push(Arc::new(SqliteWorkerTaskRepository::new(db.connect().await)));
        }
        repos
    };

    let handles: Vec<_> = repos
        .iter()
        .cloned()
        .map(|repo| {
            tokio::spawn(async move { repo.try_to_begin_work(WORK, Duration::minutes(10)).await })
        })
        .collect();

    let mut winners = 0;
    let mut in_progress = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(e) if e.is_work_in_progress() => in_progress += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(in_progress, 3);
}

#[tokio::test]
async fn test_lease_released_by_one_process_is_taken_by_another() {
    let db = SharedTestDb::new();
    let first = SqliteWorkerTaskRepository::new(db.connect().await);
    let second = SqliteWorkerTaskRepository::new(db.connect().await);

    let task_id = first.try_to_begin_work(WORK, Duration::minutes(10)).await.unwrap();
    assert!(second.try_to_begin_work(WORK, Duration::minutes(10)).await.is_err());

    first.finish_work(task_id, true).await.unwrap();
    let next_id = second.try_to_begin_work(WORK, Duration::minutes(10)).await.unwrap();

    assert_ne!(task_id, next_id);
    let lease = first.get_by_work_type(WORK).await.unwrap().unwrap();
    assert_eq!(lease.id, next_id);
    assert_eq!(lease.status, WorkerTaskStatus::Running);
}

#[tokio::test]
async fn test_crashed_holder_is_recovered_after_timeout() {
    let db = SharedTestDb::new();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    ));
    let crashed = SqliteWorkerTaskRepository::with_clock(db.connect().await, clock.clone());
    let survivor = SqliteWorkerTaskRepository::with_clock(db.connect().await, clock.clone());

    let stale_id = crashed.try_to_begin_work(WORK, Duration::seconds(30)).await.unwrap();

    clock.advance(Duration::seconds(29));
    assert!(survivor.try_to_begin_work(WORK, Duration::seconds(30)).await.is_err());

    clock.advance(Duration::seconds(1));
    let fresh_id = survivor.try_to_begin_work(WORK, Duration::seconds(30)).await.unwrap();

    // The stale holder waking up must not release the new lease.
    crashed.finish_work(stale_id, false).await.unwrap();
    let lease = survivor.get_by_work_type(WORK).await.unwrap().unwrap();
    assert_eq!(lease.id, fresh_id);
    assert_eq!(lease.status, WorkerTaskStatus::Running);
}
