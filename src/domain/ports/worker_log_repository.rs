//! Repository port for persisted worker logs.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::WorkerLog;

#[async_trait]
pub trait WorkerLogRepository: Send + Sync {
    async fn store_log(&self, log: &WorkerLog) -> DomainResult<()>;

    /// Most recent logs first.
    async fn recent(&self, limit: u32) -> DomainResult<Vec<WorkerLog>>;
}
