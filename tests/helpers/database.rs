#![allow(dead_code)]

use atlas_resolver::adapters::sqlite::{
    create_migrated_test_pool, initialize_database, PoolConfig,
};
use sqlx::SqlitePool;
use std::path::Path;
use tempfile::TempDir;

/// Create an in-memory SQLite database for testing
///
/// Each call creates a completely isolated database instance with all
/// migrations applied.
pub async fn setup_test_db() -> SqlitePool {
    create_migrated_test_pool()
        .await
        .expect("failed to create test database")
}

/// A file-backed database shared by several pools, the way separate
/// processes of one node share it.
pub struct SharedTestDb {
    dir: TempDir,
}

impl SharedTestDb {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn url(&self) -> String {
        format!("sqlite:{}", self.dir.path().join("atlas.db").display())
    }

    /// Open a new, independent pool on the shared file.
    pub async fn connect(&self) -> SqlitePool {
        let config = PoolConfig {
            max_connections: 2,
            ..PoolConfig::default()
        };
        initialize_database(&self.url(), Some(config))
            .await
            .expect("failed to open shared test database")
    }
}

/// Teardown test database
pub async fn teardown_test_db(pool: SqlitePool) {
    pool.close().await;
}
