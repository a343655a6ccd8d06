//! Service layer: the resolution engine.

pub mod bundle_storage;
pub mod donor_pool;
pub mod failed_resolutions_cache;
pub mod periodic_worker;
pub mod propositions_repository;
pub mod resolution_worker;
pub mod resolver;
pub mod strategies;

pub use bundle_storage::ShelteringBundleStorage;
pub use donor_pool::{ChallengeDonorPool, DonorPool, TransferDonorPool};
pub use failed_resolutions_cache::FailedResolutionsCache;
pub use periodic_worker::{PeriodicWork, PeriodicWorker, WorkerStatus};
pub use propositions_repository::{
    reconcile, ChallengesRepository, PropositionsRepository, TransfersRepository,
};
pub use resolution_worker::ResolutionWorker;
pub use resolver::{BundleShelteringResolver, ChallengeResolver, TransferResolver};
pub use strategies::{strategy_from_config, ResolveAllStrategy, ResolveNoneStrategy};
