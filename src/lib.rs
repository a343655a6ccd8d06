//! Atlas resolver - challenge and transfer resolution engine
//!
//! Storage nodes must periodically prove on a public ledger that they still
//! hold the bundles they shelter. This crate discovers open challenges and
//! transfers, decides whether this node should act on each one, downloads the
//! bundle from a holder or a donor, and submits the resolution, while several
//! processes of the same node compete for the work.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Service Layer** (`services`): reconciliation, resolution, scheduling
//! - **Adapters** (`adapters`): SQLite persistence and HTTP bundle download
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): operations commands
//!
//! Ledger access (`PropositionLedger`, `BundleRegistry`, `NodeDirectory`) is
//! supplied by the embedding node.
//!
//! # Example
//!
//! ```ignore
//! use atlas_resolver::services::{ChallengeResolver, PeriodicWorker, ResolutionWorker};
//!
//! let worker = ResolutionWorker::new(&config.worker, tasks, logs, challenges, transfers)?;
//! let scheduler = PeriodicWorker::new(Arc::new(worker), interval);
//! scheduler.start().await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult, DownloadError, ResolutionError, WorkerError};
pub use domain::models::{
    BatchReport, BundleMetadata, Challenge, Config, Proposition, ResolutionOutcome, SkipReason,
    Transfer, WorkerTask, WorkerTaskStatus,
};
pub use domain::ports::{
    BundleRegistry, BundleStorage, NodeDirectory, PropositionLedger, ResolutionStrategy,
    WorkerTaskRepository,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    ChallengeResolver, FailedResolutionsCache, PeriodicWorker, ResolutionWorker, TransferResolver,
};
