//! Repository port for bundles this node shelters.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::ShelteredBundle;

#[async_trait]
pub trait ShelteredBundleRepository: Send + Sync {
    /// Insert or refresh a sheltered bundle.
    async fn mark_sheltered(&self, bundle_id: &str) -> DomainResult<()>;

    async fn is_sheltered(&self, bundle_id: &str) -> DomainResult<bool>;

    /// Most recently sheltered first.
    async fn recent(&self, limit: u32) -> DomainResult<Vec<ShelteredBundle>>;
}
