//! Ledger port mapping node addresses to their public URLs.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

#[async_trait]
pub trait NodeDirectory: Send + Sync {
    /// Base URL under which `address` serves bundles.
    async fn node_url(&self, address: &str) -> DomainResult<String>;
}
