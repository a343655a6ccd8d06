pub mod bundle;
pub mod config;
pub mod outcome;
pub mod proposition;
pub mod worker_log;
pub mod worker_task;

pub use bundle::{BundleMetadata, ShelteredBundle};
pub use config::{
    duration_from_secs, Config, DatabaseConfig, LoggingConfig, NodeConfig, ResolutionConfig,
    ResolutionMode, StrategyKind, WorkerConfig, MAX_TIMEOUT_SECS,
};
pub use outcome::{BatchReport, ResolutionOutcome, SkipReason};
pub use proposition::{
    same_address, Challenge, LedgerPosition, Proposition, PropositionKind, ResolvedEvent,
    TimedOutEvent, Transfer, TxReceipt,
};
pub use worker_log::{WorkerLog, WorkerLogLevel};
pub use worker_task::{WorkerTask, WorkerTaskStatus};
