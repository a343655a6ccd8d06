//! SQLite adapter for WorkerTaskRepository.
//!
//! The lease is a single row per work type. Acquisition is one guarded
//! upsert: it inserts the row or takes it over only while its status is not
//! `RUNNING`, so two racing processes can never both see a changed row.

use async_trait::async_trait;
use chrono::Duration;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adapters::sqlite::{format_datetime, parse_datetime, parse_optional_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{WorkerTask, WorkerTaskStatus};
use crate::domain::ports::{Clock, SystemClock, WorkerTaskRepository};

#[derive(Clone)]
pub struct SqliteWorkerTaskRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteWorkerTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_clock(pool, Arc::new(SystemClock))
    }

    pub fn with_clock(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Move expired `RUNNING` leases of `work_type` to `TIMEOUT`.
    async fn expire_stale(&self, work_type: &str, now: &str) -> DomainResult<u64> {
        let result = sqlx::query(
            "UPDATE worker_tasks SET status = ?1, end_time = ?2
             WHERE work_type = ?3 AND status = ?4 AND task_timeout <= ?2",
        )
        .bind(WorkerTaskStatus::Timeout.as_str())
        .bind(now)
        .bind(work_type)
        .bind(WorkerTaskStatus::Running.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct WorkerTaskRow {
    id: String,
    work_type: String,
    status: String,
    start_time: String,
    end_time: Option<String>,
    task_timeout: String,
}

impl TryFrom<WorkerTaskRow> for WorkerTask {
    type Error = DomainError;

    fn try_from(row: WorkerTaskRow) -> Result<Self, Self::Error> {
        let status = WorkerTaskStatus::from_str(&row.status).ok_or_else(|| {
            DomainError::SerializationError(format!("unknown worker task status: {}", row.status))
        })?;

        Ok(Self {
            id: parse_uuid(&row.id)?,
            work_type: row.work_type,
            status,
            start_time: parse_datetime(&row.start_time)?,
            end_time: parse_optional_datetime(row.end_time)?,
            task_timeout: parse_datetime(&row.task_timeout)?,
        })
    }
}

#[async_trait]
impl WorkerTaskRepository for SqliteWorkerTaskRepository {
    async fn try_to_begin_work(&self, work_type: &str, timeout: Duration) -> DomainResult<Uuid> {
        let now = self.clock.now();
        let now_str = format_datetime(now);
        let deadline = now.checked_add_signed(timeout).ok_or_else(|| {
            DomainError::InvalidConfig(format!(
                "lease timeout of {}s for {work_type} is out of range",
                timeout.num_seconds()
            ))
        })?;

        let expired = self.expire_stale(work_type, &now_str).await?;
        if expired > 0 {
            warn!(work_type, "previous worker task timed out, lease recovered");
        }

        let id = Uuid::new_v4();
        let result = sqlx::query(
            "INSERT INTO worker_tasks (work_type, id, status, start_time, end_time, task_timeout)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5)
             ON CONFLICT(work_type) DO UPDATE SET
                id = excluded.id,
                status = excluded.status,
                start_time = excluded.start_time,
                end_time = NULL,
                task_timeout = excluded.task_timeout
             WHERE worker_tasks.status != ?3",
        )
        .bind(work_type)
        .bind(id.to_string())
        .bind(WorkerTaskStatus::Running.as_str())
        .bind(&now_str)
        .bind(format_datetime(deadline))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!(work_type, "lease held by another worker");
            return Err(DomainError::WorkInProgress {
                work_type: work_type.to_string(),
            });
        }

        info!(work_type, task_id = %id, timeout_secs = timeout.num_seconds(), "worker task started");
        Ok(id)
    }

    async fn finish_work(&self, task_id: Uuid, success: bool) -> DomainResult<()> {
        let status = WorkerTaskStatus::finished(success);
        let result = sqlx::query("UPDATE worker_tasks SET status = ?, end_time = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(format_datetime(self.clock.now()))
            .bind(task_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            debug!(task_id = %task_id, "worker task no longer exists, nothing to finish");
        } else {
            info!(task_id = %task_id, status = %status, "worker task finished");
        }
        Ok(())
    }

    async fn get_by_work_type(&self, work_type: &str) -> DomainResult<Option<WorkerTask>> {
        let row: Option<WorkerTaskRow> = sqlx::query_as("SELECT * FROM worker_tasks WHERE work_type = ?")
            .bind(work_type)
            .fetch_optional(&self.pool)
            .await?;

        row.map(WorkerTask::try_from).transpose()
    }

    async fn list(&self) -> DomainResult<Vec<WorkerTask>> {
        let rows: Vec<WorkerTaskRow> = sqlx::query_as("SELECT * FROM worker_tasks ORDER BY work_type")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(WorkerTask::try_from).collect()
    }
}
