//! Resolution of challenges and transfers.
//!
//! The algorithm is written once for any [`Proposition`]. Challenges and
//! transfers differ only in their field names (mapped by the `Proposition`
//! impls) and in the [`DonorPool`] consulted when the primary holder fails.
//!
//! Per proposition, in order:
//! 1. skip while a previous failure's backoff window is open
//! 2. skip unless the ledger accepts a resolution and names this node as the
//!    designated resolver
//! 3. ask the strategy whether to fetch
//! 4. download from the holder, falling back to random donors
//! 5. ask the strategy whether to resolve, given the bundle
//! 6. submit the resolution and mark the bundle as sheltered
//! 7. run the strategy's post-resolution hook
//!
//! Any error in steps 2 to 6 records a backoff and yields
//! [`ResolutionOutcome::Failed`]; it never aborts the batch.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::errors::{DomainResult, ResolutionError};
use crate::domain::models::{
    same_address, BatchReport, BundleMetadata, Challenge, Proposition, ResolutionConfig,
    ResolutionOutcome, SkipReason, Transfer,
};
use crate::domain::ports::{
    BundleRegistry, BundleStorage, Clock, PropositionLedger, RandomIndex, ResolutionStrategy,
    SystemClock, ThreadRandom,
};
use crate::services::donor_pool::{ChallengeDonorPool, DonorPool, TransferDonorPool};
use crate::services::failed_resolutions_cache::FailedResolutionsCache;
use crate::services::propositions_repository::PropositionsRepository;
use crate::services::strategies::strategy_from_config;

const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves open propositions of one kind on behalf of `node_address`.
///
/// Holds the process-local backoff cache; build one per proposition kind and
/// keep it for the life of the process.
pub struct BundleShelteringResolver<P: Proposition> {
    repository: PropositionsRepository<P>,
    donor_pool: Arc<dyn DonorPool<P>>,
    storage: Arc<dyn BundleStorage>,
    strategy: Arc<dyn ResolutionStrategy<P>>,
    random: Arc<dyn RandomIndex>,
    failed: Mutex<FailedResolutionsCache>,
    download_timeout: Duration,
}

pub type ChallengeResolver = BundleShelteringResolver<Challenge>;
pub type TransferResolver = BundleShelteringResolver<Transfer>;

impl<P: Proposition> BundleShelteringResolver<P> {
    /// Resolver with thread-local random donor selection, the system clock
    /// and a 10 second download timeout.
    pub fn new(
        repository: PropositionsRepository<P>,
        donor_pool: Arc<dyn DonorPool<P>>,
        storage: Arc<dyn BundleStorage>,
        strategy: Arc<dyn ResolutionStrategy<P>>,
    ) -> Self {
        Self {
            repository,
            donor_pool,
            storage,
            strategy,
            random: Arc::new(ThreadRandom),
            failed: Mutex::new(FailedResolutionsCache::new(Arc::new(SystemClock))),
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
        }
    }

    /// Replace the donor selection source.
    pub fn with_random(mut self, random: Arc<dyn RandomIndex>) -> Self {
        self.random = random;
        self
    }

    /// Replace the clock driving the backoff cache. Clears the cache.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.failed = Mutex::new(FailedResolutionsCache::new(clock));
        self
    }

    /// Per-attempt timeout handed to [`BundleStorage::download_bundle`].
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Replace the strategy and download timeout with the configured ones.
    pub fn with_config(mut self, config: &ResolutionConfig) -> DomainResult<Self> {
        self.strategy = strategy_from_config(config)?;
        self.download_timeout = Duration::from_millis(config.download_timeout_ms);
        Ok(self)
    }

    /// Address this node resolves as.
    pub fn node_address(&self) -> &str {
        self.repository.node_address()
    }

    /// Resolve open propositions in ledger order until one succeeds.
    pub async fn resolve_one(&self) -> DomainResult<BatchReport> {
        self.resolve_batch(true).await
    }

    /// Attempt every open proposition.
    pub async fn resolve_all(&self) -> DomainResult<BatchReport> {
        self.resolve_batch(false).await
    }

    async fn resolve_batch(&self, stop_at_first: bool) -> DomainResult<BatchReport> {
        let open = self.repository.ongoing().await?;
        let mut report = BatchReport {
            open: open.len(),
            ..BatchReport::default()
        };

        for proposition in &open {
            let outcome = self.try_to_resolve(proposition).await;
            report.record(&outcome);
            if stop_at_first && outcome.is_resolved() {
                break;
            }
        }

        let purged = self.failed.lock().await.clear_outdated();
        debug!(kind = %P::KIND, purged, ?report, "resolution batch finished");
        Ok(report)
    }

    /// Run the full state machine for one proposition. Never fails; errors
    /// are recorded as backoff and returned as `Failed`.
    pub async fn try_to_resolve(&self, proposition: &P) -> ResolutionOutcome {
        if self.failed.lock().await.did_fail_recently(proposition.id()) {
            debug!(kind = %P::KIND, id = proposition.id(), "skipping, failed recently");
            return ResolutionOutcome::Skipped(SkipReason::RecentlyFailed);
        }

        match self.resolve(proposition).await {
            Ok(outcome) => outcome,
            Err(err) => {
                let retry_timeout = self.strategy.retry_timeout();
                self.failed
                    .lock()
                    .await
                    .remember_failed(proposition.id(), retry_timeout);
                warn!(
                    kind = %P::KIND,
                    id = proposition.id(),
                    bundle_id = proposition.bundle_id(),
                    failure = err.kind().as_str(),
                    retry_in_secs = retry_timeout.num_seconds(),
                    error = %err,
                    "failed to resolve"
                );
                ResolutionOutcome::Failed(err)
            }
        }
    }

    /// Whether `id` is inside its backoff window.
    pub async fn did_fail_recently(&self, id: &str) -> bool {
        self.failed.lock().await.did_fail_recently(id)
    }

    async fn resolve(&self, proposition: &P) -> Result<ResolutionOutcome, ResolutionError> {
        if let Some(reason) = self.check_turn(proposition).await? {
            return Ok(ResolutionOutcome::Skipped(reason));
        }

        if !self.strategy.should_fetch_bundle(proposition).await? {
            debug!(kind = %P::KIND, id = proposition.id(), "strategy declined to fetch");
            return Ok(ResolutionOutcome::Skipped(SkipReason::FetchDeclined));
        }

        let bundle = self.download_with_fallback(proposition).await?;
        if bundle.bundle_id != proposition.bundle_id() {
            return Err(ResolutionError::InvalidBundle {
                bundle_id: proposition.bundle_id().to_string(),
                reason: format!("storage returned bundle {}", bundle.bundle_id),
            });
        }

        if !self.strategy.should_resolve(&bundle).await? {
            debug!(kind = %P::KIND, id = proposition.id(), "strategy declined to resolve");
            return Ok(ResolutionOutcome::Skipped(SkipReason::ResolveDeclined));
        }

        let receipt = self.repository.ledger().submit_resolution(proposition).await?;
        self.storage
            .mark_bundle_as_sheltered(proposition.bundle_id())
            .await
            .map_err(|e| ResolutionError::Storage(e.to_string()))?;

        info!(
            kind = %P::KIND,
            id = proposition.id(),
            bundle_id = proposition.bundle_id(),
            tx = %receipt.transaction_hash,
            "resolved"
        );

        if let Err(err) = self.strategy.after_resolution(proposition).await {
            warn!(kind = %P::KIND, id = proposition.id(), error = %err, "post-resolution hook failed");
        }

        Ok(ResolutionOutcome::Resolved)
    }

    /// `None` when it is this node's turn.
    async fn check_turn(&self, proposition: &P) -> Result<Option<SkipReason>, ResolutionError> {
        let ledger = self.repository.ledger();

        if !ledger.can_resolve(proposition.id()).await? {
            debug!(kind = %P::KIND, id = proposition.id(), "no longer resolvable");
            return Ok(Some(SkipReason::AlreadyClosed));
        }

        let designated = ledger.designated_resolver(proposition).await?;
        if !same_address(&designated, self.node_address()) {
            debug!(kind = %P::KIND, id = proposition.id(), designated = %designated, "not our turn");
            return Ok(Some(SkipReason::NotOurTurn));
        }

        Ok(None)
    }

    async fn download_with_fallback(&self, proposition: &P) -> Result<BundleMetadata, ResolutionError> {
        let bundle_id = proposition.bundle_id();
        let holder = proposition.holder();

        let mut last_error = match self
            .storage
            .download_bundle(bundle_id, holder, self.download_timeout)
            .await
        {
            Ok(bundle) => return Ok(bundle),
            Err(err) => err,
        };
        warn!(bundle_id, holder, error = %last_error, "holder could not serve bundle, trying donors");

        let mut tried: HashSet<String> = HashSet::from([
            holder.to_ascii_lowercase(),
            self.node_address().to_ascii_lowercase(),
        ]);
        let mut donors: Vec<String> = self
            .donor_pool
            .candidates(proposition)
            .await?
            .into_iter()
            .filter(|donor| tried.insert(donor.to_ascii_lowercase()))
            .collect();

        if donors.is_empty() {
            return Err(ResolutionError::Download {
                bundle_id: bundle_id.to_string(),
                holder: holder.to_string(),
                source: last_error,
            });
        }

        let mut attempts = 1;
        while !donors.is_empty() {
            let donor = donors.remove(self.random.pick(donors.len()));
            attempts += 1;

            match self
                .storage
                .download_bundle(bundle_id, &donor, self.download_timeout)
                .await
            {
                Ok(bundle) => {
                    info!(bundle_id, donor = %donor, attempts, "bundle downloaded from donor");
                    return Ok(bundle);
                }
                Err(err) => {
                    debug!(bundle_id, donor = %donor, error = %err, "donor could not serve bundle");
                    last_error = err;
                }
            }
        }

        Err(ResolutionError::NoDonorsAvailable {
            bundle_id: bundle_id.to_string(),
            attempts,
            last_error,
        })
    }
}

impl BundleShelteringResolver<Challenge> {
    /// Challenge resolver falling back to shelterers and the uploader.
    pub fn for_challenges(
        ledger: Arc<dyn PropositionLedger<Challenge>>,
        registry: Arc<dyn BundleRegistry>,
        storage: Arc<dyn BundleStorage>,
        strategy: Arc<dyn ResolutionStrategy<Challenge>>,
        node_address: impl Into<String>,
    ) -> Self {
        Self::new(
            PropositionsRepository::new(ledger, node_address),
            Arc::new(ChallengeDonorPool::new(registry)),
            storage,
            strategy,
        )
    }
}

impl BundleShelteringResolver<Transfer> {
    /// Transfer resolver falling back to the other current shelterers.
    pub fn for_transfers(
        ledger: Arc<dyn PropositionLedger<Transfer>>,
        registry: Arc<dyn BundleRegistry>,
        storage: Arc<dyn BundleStorage>,
        strategy: Arc<dyn ResolutionStrategy<Transfer>>,
        node_address: impl Into<String>,
    ) -> Self {
        Self::new(
            PropositionsRepository::new(ledger, node_address),
            Arc::new(TransferDonorPool::new(registry)),
            storage,
            strategy,
        )
    }
}
