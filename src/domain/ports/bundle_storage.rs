//! Storage port used by the resolver to fetch and keep bundles.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::errors::{DomainResult, DownloadError};
use crate::domain::models::BundleMetadata;

#[async_trait]
pub trait BundleStorage: Send + Sync {
    /// Download a bundle from `holder`. Each failure mode maps to its own
    /// [`DownloadError`] variant.
    async fn download_bundle(
        &self,
        bundle_id: &str,
        holder: &str,
        timeout: Duration,
    ) -> Result<BundleMetadata, DownloadError>;

    /// Record that this node now shelters the bundle. Must be idempotent.
    async fn mark_bundle_as_sheltered(&self, bundle_id: &str) -> DomainResult<()>;
}
