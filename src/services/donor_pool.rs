//! Where to look for a bundle when its primary holder cannot serve it.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Challenge, Proposition, Transfer};
use crate::domain::ports::BundleRegistry;

/// Candidate donors for a proposition, before the primary holder, this node
/// and already tried ids are filtered out by the resolver.
#[async_trait]
pub trait DonorPool<P: Proposition>: Send + Sync {
    async fn candidates(&self, proposition: &P) -> DomainResult<Vec<String>>;
}

/// Challenges: every current shelterer plus the original uploader, which
/// still holds freshly uploaded bundles before anyone else shelters them.
pub struct ChallengeDonorPool {
    registry: Arc<dyn BundleRegistry>,
}

impl ChallengeDonorPool {
    pub fn new(registry: Arc<dyn BundleRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl DonorPool<Challenge> for ChallengeDonorPool {
    async fn candidates(&self, challenge: &Challenge) -> DomainResult<Vec<String>> {
        let (mut holders, uploader) = futures::try_join!(
            self.registry.current_holders(&challenge.bundle_id),
            self.registry.original_uploader(&challenge.bundle_id),
        )?;
        holders.push(uploader);
        Ok(holders)
    }
}

/// Transfers: the bundle is already sheltered, so only current shelterers
/// are asked.
pub struct TransferDonorPool {
    registry: Arc<dyn BundleRegistry>,
}

impl TransferDonorPool {
    pub fn new(registry: Arc<dyn BundleRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl DonorPool<Transfer> for TransferDonorPool {
    async fn candidates(&self, transfer: &Transfer) -> DomainResult<Vec<String>> {
        self.registry.current_holders(transfer.bundle_id()).await
    }
}
