//! Ledger port describing who holds a bundle.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

#[async_trait]
pub trait BundleRegistry: Send + Sync {
    /// Addresses currently sheltering the bundle.
    async fn current_holders(&self, bundle_id: &str) -> DomainResult<Vec<String>>;

    /// Address that originally uploaded the bundle.
    async fn original_uploader(&self, bundle_id: &str) -> DomainResult<String>;
}
