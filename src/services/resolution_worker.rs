//! Periodic work that resolves challenges and transfers under the task lease.

use async_trait::async_trait;
use chrono::Duration;
use futures::FutureExt;
use serde_json::json;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    duration_from_secs, BatchReport, ResolutionMode, WorkerConfig, WorkerLog,
};
use crate::domain::ports::{WorkerLogRepository, WorkerTaskRepository};
use crate::services::periodic_worker::PeriodicWork;
use crate::services::resolver::{ChallengeResolver, TransferResolver};

/// One tick: take the lease, run both resolvers, release the lease.
///
/// Every process of a node runs this worker against the same database; the
/// lease keyed by `work_type` ensures only one of them resolves at a time.
pub struct ResolutionWorker {
    work_type: String,
    lease_timeout: Duration,
    mode: ResolutionMode,
    tasks: Arc<dyn WorkerTaskRepository>,
    logs: Arc<dyn WorkerLogRepository>,
    challenges: Arc<ChallengeResolver>,
    transfers: Arc<TransferResolver>,
}

impl ResolutionWorker {
    /// Fails when `lease_timeout_secs` cannot be represented as a deadline.
    pub fn new(
        config: &WorkerConfig,
        tasks: Arc<dyn WorkerTaskRepository>,
        logs: Arc<dyn WorkerLogRepository>,
        challenges: Arc<ChallengeResolver>,
        transfers: Arc<TransferResolver>,
    ) -> DomainResult<Self> {
        let lease_timeout = duration_from_secs(config.lease_timeout_secs).ok_or_else(|| {
            DomainError::InvalidConfig(format!(
                "lease_timeout_secs {} is out of range",
                config.lease_timeout_secs
            ))
        })?;

        Ok(Self {
            work_type: config.work_type.clone(),
            lease_timeout,
            mode: config.mode,
            tasks,
            logs,
            challenges,
            transfers,
        })
    }

    pub fn work_type(&self) -> &str {
        &self.work_type
    }

    async fn run_batches(&self) -> DomainResult<(BatchReport, BatchReport)> {
        match self.mode {
            ResolutionMode::One => Ok((
                self.challenges.resolve_one().await?,
                self.transfers.resolve_one().await?,
            )),
            ResolutionMode::All => Ok((
                self.challenges.resolve_all().await?,
                self.transfers.resolve_all().await?,
            )),
        }
    }

    async fn store_log(&self, log: WorkerLog) {
        if let Err(e) = self.logs.store_log(&log).await {
            warn!(work_type = %self.work_type, error = %e, "failed to persist worker log");
        }
    }
}

#[async_trait]
impl PeriodicWork for ResolutionWorker {
    fn name(&self) -> &str {
        &self.work_type
    }

    async fn periodic_work(&self) -> DomainResult<()> {
        let task_id = match self
            .tasks
            .try_to_begin_work(&self.work_type, self.lease_timeout)
            .await
        {
            Ok(id) => id,
            Err(e) if e.is_work_in_progress() => {
                debug!(work_type = %self.work_type, "lease held elsewhere, skipping tick");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let result = match AssertUnwindSafe(self.run_batches()).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                // Release the lease before the scheduler sees the panic.
                if let Err(e) = self.tasks.finish_work(task_id, false).await {
                    error!(work_type = %self.work_type, %task_id, error = %e, "failed to release lease after panic");
                }
                self.store_log(
                    WorkerLog::error(&self.work_type, "resolution tick panicked", "panic")
                        .with_details(json!({ "task_id": task_id })),
                )
                .await;
                std::panic::resume_unwind(panic);
            }
        };
        self.tasks.finish_work(task_id, result.is_ok()).await?;

        match result {
            Ok((challenges, transfers)) => {
                info!(
                    work_type = %self.work_type,
                    %task_id,
                    challenges_resolved = challenges.resolved,
                    transfers_resolved = transfers.resolved,
                    "resolution tick finished"
                );
                let details = json!({
                    "task_id": task_id,
                    "mode": self.mode,
                    "challenges": challenges,
                    "transfers": transfers,
                });
                self.store_log(
                    WorkerLog::info(&self.work_type, "resolution tick finished").with_details(details),
                )
                .await;
                Ok(())
            }
            Err(e) => {
                self.store_log(
                    WorkerLog::error(&self.work_type, "resolution tick failed", &e)
                        .with_details(json!({ "task_id": task_id })),
                )
                .await;
                Err(e)
            }
        }
    }
}
