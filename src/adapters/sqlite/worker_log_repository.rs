//! SQLite adapter for WorkerLogRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::adapters::sqlite::{format_datetime, parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{WorkerLog, WorkerLogLevel};
use crate::domain::ports::WorkerLogRepository;

#[derive(Clone)]
pub struct SqliteWorkerLogRepository {
    pool: SqlitePool,
}

impl SqliteWorkerLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct WorkerLogRow {
    id: String,
    timestamp: String,
    worker: String,
    level: String,
    message: String,
    details: Option<String>,
    error: Option<String>,
}

fn row_to_log(row: WorkerLogRow) -> DomainResult<WorkerLog> {
    let level = WorkerLogLevel::from_str(&row.level)
        .ok_or_else(|| DomainError::SerializationError(format!("unknown log level: {}", row.level)))?;
    let details = row.details.map(|d| serde_json::from_str(&d)).transpose()?;

    Ok(WorkerLog {
        id: parse_uuid(&row.id)?,
        timestamp: parse_datetime(&row.timestamp)?,
        worker: row.worker,
        level,
        message: row.message,
        details,
        error: row.error,
    })
}

#[async_trait]
impl WorkerLogRepository for SqliteWorkerLogRepository {
    async fn store_log(&self, log: &WorkerLog) -> DomainResult<()> {
        let details = log.details.as_ref().map(serde_json::to_string).transpose()?;

        sqlx::query(
            "INSERT INTO worker_logs (id, timestamp, worker, level, message, details, error)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(log.id.to_string())
        .bind(format_datetime(log.timestamp))
        .bind(&log.worker)
        .bind(log.level.as_str())
        .bind(&log.message)
        .bind(&details)
        .bind(&log.error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent(&self, limit: u32) -> DomainResult<Vec<WorkerLog>> {
        let rows: Vec<WorkerLogRow> =
            sqlx::query_as("SELECT * FROM worker_logs ORDER BY timestamp DESC, rowid DESC LIMIT ?")
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(row_to_log).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use serde_json::json;

    #[tokio::test]
    async fn test_store_and_read_back_newest_first() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteWorkerLogRepository::new(pool);

        let first = WorkerLog::info("resolution", "Tick finished").with_details(json!({"resolved": 1}));
        let mut second = WorkerLog::error("resolution", "Tick failed", "rpc down");
        second.timestamp = first.timestamp + chrono::Duration::seconds(1);

        repo.store_log(&first).await.unwrap();
        repo.store_log(&second).await.unwrap();

        let logs = repo.recent(10).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].message, "Tick failed");
        assert_eq!(logs[0].error.as_deref(), Some("rpc down"));
        assert_eq!(logs[1].details, Some(json!({"resolved": 1})));

        assert_eq!(repo.recent(1).await.unwrap().len(), 1);
    }
}
