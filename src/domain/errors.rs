//! Domain errors for the resolution engine.

use thiserror::Error;

/// Errors raised by repositories, ledger collaborators and the worker loop.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Work of this type is currently in progress: {work_type}")]
    WorkInProgress { work_type: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Lease contention is expected and only skips the current tick.
    pub fn is_work_in_progress(&self) -> bool {
        matches!(self, Self::WorkInProgress { .. })
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

/// Why a single download attempt failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DownloadError {
    #[error("holder unreachable: {0}")]
    Unreachable(String),

    #[error("download timed out after {0}ms")]
    Timeout(u64),

    #[error("holder responded with status {0}")]
    HttpStatus(u16),

    #[error("downloaded bundle is invalid: {0}")]
    Validation(String),
}

impl DownloadError {
    /// The holder answered, but with content we cannot accept.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Coarse classification of a failed resolution, for routing remedial logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Validation,
    Ledger,
    Storage,
    Policy,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Validation => "validation",
            Self::Ledger => "ledger",
            Self::Storage => "storage",
            Self::Policy => "policy",
        }
    }
}

/// Errors that end a single resolution attempt. Always recorded as backoff.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Could not download bundle {bundle_id} from {holder}: {source}")]
    Download {
        bundle_id: String,
        holder: String,
        #[source]
        source: DownloadError,
    },

    #[error("No donors available for bundle {bundle_id} after {attempts} attempt(s): {last_error}")]
    NoDonorsAvailable {
        bundle_id: String,
        attempts: usize,
        last_error: DownloadError,
    },

    #[error("Bundle {bundle_id} is invalid: {reason}")]
    InvalidBundle { bundle_id: String, reason: String },

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Strategy error: {0}")]
    Strategy(String),
}

impl ResolutionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Download { source, .. } | Self::NoDonorsAvailable { last_error: source, .. } => {
                if source.is_validation() {
                    FailureKind::Validation
                } else {
                    FailureKind::Transport
                }
            }
            Self::InvalidBundle { .. } => FailureKind::Validation,
            Self::Ledger(_) => FailureKind::Ledger,
            Self::Storage(_) => FailureKind::Storage,
            Self::Strategy(_) => FailureKind::Policy,
        }
    }
}

impl From<DomainError> for ResolutionError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Ledger(msg) => Self::Ledger(msg),
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Lifecycle errors of a periodic worker.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkerError {
    #[error("Worker already started")]
    AlreadyStarted,
}
