//! Worker task lease model.
//!
//! One row exists per work type. Whoever moves it into `Running` holds the
//! lease until `task_timeout`, after which any process may take it over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a worker task lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerTaskStatus {
    /// A process currently holds the lease.
    Running,
    /// The holder did not finish before its deadline.
    Timeout,
    /// The last holder finished successfully.
    Success,
    /// The last holder finished with an error.
    Failure,
}

impl WorkerTaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Timeout => "TIMEOUT",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "RUNNING" => Some(Self::Running),
            "TIMEOUT" => Some(Self::Timeout),
            "SUCCESS" => Some(Self::Success),
            "FAILURE" => Some(Self::Failure),
            _ => None,
        }
    }

    /// Status recorded when a holder releases the lease.
    pub fn finished(success: bool) -> Self {
        if success {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

impl std::fmt::Display for WorkerTaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lease record for one work type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerTask {
    /// Regenerated on every acquisition, so a late `finish_work` from a
    /// previous holder cannot release a newer lease.
    pub id: Uuid,
    pub work_type: String,
    pub status: WorkerTaskStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Absolute deadline of the current holder.
    pub task_timeout: DateTime<Utc>,
}

impl WorkerTask {
    /// A running lease whose deadline has passed.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.status == WorkerTaskStatus::Running && self.task_timeout <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            WorkerTaskStatus::Running,
            WorkerTaskStatus::Timeout,
            WorkerTaskStatus::Success,
            WorkerTaskStatus::Failure,
        ] {
            assert_eq!(WorkerTaskStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(WorkerTaskStatus::from_str("running"), Some(WorkerTaskStatus::Running));
        assert_eq!(WorkerTaskStatus::from_str("paused"), None);
    }

    #[test]
    fn test_finished_status() {
        assert_eq!(WorkerTaskStatus::finished(true), WorkerTaskStatus::Success);
        assert_eq!(WorkerTaskStatus::finished(false), WorkerTaskStatus::Failure);
    }

    #[test]
    fn test_is_stale_only_for_expired_running_tasks() {
        let now = Utc::now();
        let mut task = WorkerTask {
            id: Uuid::new_v4(),
            work_type: "X".to_string(),
            status: WorkerTaskStatus::Running,
            start_time: now - Duration::seconds(20),
            end_time: None,
            task_timeout: now - Duration::seconds(1),
        };
        assert!(task.is_stale(now));

        task.status = WorkerTaskStatus::Success;
        assert!(!task.is_stale(now));

        task.status = WorkerTaskStatus::Running;
        task.task_timeout = now + Duration::seconds(10);
        assert!(!task.is_stale(now));
    }
}
