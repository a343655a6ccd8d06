//! Repository port for cross-process worker leases.

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::WorkerTask;

#[async_trait]
pub trait WorkerTaskRepository: Send + Sync {
    /// Take the lease for `work_type`, expiring stale holders first.
    ///
    /// Fails with `DomainError::WorkInProgress` while another holder's lease
    /// is still valid. Of two racing callers exactly one succeeds.
    async fn try_to_begin_work(&self, work_type: &str, timeout: Duration) -> DomainResult<Uuid>;

    /// Release the lease. A no-op when `task_id` no longer exists.
    async fn finish_work(&self, task_id: Uuid, success: bool) -> DomainResult<()>;

    /// Current lease row for a work type.
    async fn get_by_work_type(&self, work_type: &str) -> DomainResult<Option<WorkerTask>>;

    /// All lease rows, ordered by work type.
    async fn list(&self) -> DomainResult<Vec<WorkerTask>>;
}
