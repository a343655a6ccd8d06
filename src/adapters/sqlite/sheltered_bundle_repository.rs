//! SQLite adapter for ShelteredBundleRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::adapters::sqlite::{format_datetime, parse_datetime};
use crate::domain::errors::DomainResult;
use crate::domain::models::ShelteredBundle;
use crate::domain::ports::{Clock, ShelteredBundleRepository, SystemClock};

#[derive(Clone)]
pub struct SqliteShelteredBundleRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteShelteredBundleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl ShelteredBundleRepository for SqliteShelteredBundleRepository {
    async fn mark_sheltered(&self, bundle_id: &str) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO sheltered_bundles (bundle_id, sheltered_at) VALUES (?1, ?2)
             ON CONFLICT(bundle_id) DO UPDATE SET sheltered_at = excluded.sheltered_at",
        )
        .bind(bundle_id)
        .bind(format_datetime(self.clock.now()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn is_sheltered(&self, bundle_id: &str) -> DomainResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM sheltered_bundles WHERE bundle_id = ?")
            .bind(bundle_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    async fn recent(&self, limit: u32) -> DomainResult<Vec<ShelteredBundle>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT bundle_id, sheltered_at FROM sheltered_bundles ORDER BY sheltered_at DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(bundle_id, sheltered_at)| {
                Ok(ShelteredBundle {
                    bundle_id,
                    sheltered_at: parse_datetime(&sheltered_at)?,
                })
            })
            .collect()
    }
}
