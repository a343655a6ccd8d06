//! Persisted worker log entries for operational audit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerLogLevel {
    Info,
    Error,
}

impl WorkerLogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "info" => Some(Self::Info),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// A single worker log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerLog {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub worker: String,
    pub level: WorkerLogLevel,
    pub message: String,
    pub details: Option<Value>,
    pub error: Option<String>,
}

impl WorkerLog {
    pub fn info(worker: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            worker: worker.into(),
            level: WorkerLogLevel::Info,
            message: message.into(),
            details: None,
            error: None,
        }
    }

    pub fn error(worker: impl Into<String>, message: impl Into<String>, error: impl ToString) -> Self {
        Self {
            level: WorkerLogLevel::Error,
            error: Some(error.to_string()),
            ..Self::info(worker, message)
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_log_carries_error_text() {
        let log = WorkerLog::error("resolution", "Tick failed", "boom")
            .with_details(json!({"work_type": "X"}));
        assert_eq!(log.level, WorkerLogLevel::Error);
        assert_eq!(log.error.as_deref(), Some("boom"));
        assert_eq!(log.details, Some(json!({"work_type": "X"})));
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(WorkerLogLevel::from_str("INFO"), Some(WorkerLogLevel::Info));
        assert_eq!(WorkerLogLevel::from_str("warn"), None);
    }
}
