//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the resolution engine depends on:
//! - PropositionLedger, BundleRegistry, NodeDirectory: ledger collaborators
//! - BundleStorage: bundle download and local sheltering state
//! - WorkerTaskRepository: cross-process lease
//! - WorkerLogRepository, ShelteredBundleRepository: persistence
//! - ResolutionStrategy: participation policy
//! - Clock, RandomIndex: injectable time and randomness

pub mod bundle_registry;
pub mod bundle_storage;
pub mod clock;
pub mod ledger;
pub mod node_directory;
pub mod random;
pub mod sheltered_bundle_repository;
pub mod strategy;
pub mod worker_log_repository;
pub mod worker_task_repository;

pub use bundle_registry::BundleRegistry;
pub use bundle_storage::BundleStorage;
pub use clock::{Clock, ManualClock, SystemClock};
pub use ledger::PropositionLedger;
pub use node_directory::NodeDirectory;
pub use random::{FirstIndex, RandomIndex, ThreadRandom};
pub use sheltered_bundle_repository::ShelteredBundleRepository;
pub use strategy::ResolutionStrategy;
pub use worker_log_repository::WorkerLogRepository;
pub use worker_task_repository::WorkerTaskRepository;
