//! `BundleStorage` backed by HTTP downloads and the local sheltered table.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::adapters::http::HttpBundleFetcher;
use crate::domain::errors::{DomainResult, DownloadError};
use crate::domain::models::BundleMetadata;
use crate::domain::ports::{BundleStorage, ShelteredBundleRepository};

pub struct ShelteringBundleStorage {
    fetcher: HttpBundleFetcher,
    sheltered: Arc<dyn ShelteredBundleRepository>,
}

impl ShelteringBundleStorage {
    pub fn new(fetcher: HttpBundleFetcher, sheltered: Arc<dyn ShelteredBundleRepository>) -> Self {
        Self { fetcher, sheltered }
    }
}

#[async_trait]
impl BundleStorage for ShelteringBundleStorage {
    async fn download_bundle(
        &self,
        bundle_id: &str,
        holder: &str,
        timeout: Duration,
    ) -> Result<BundleMetadata, DownloadError> {
        self.fetcher.fetch(bundle_id, holder, timeout).await
    }

    async fn mark_bundle_as_sheltered(&self, bundle_id: &str) -> DomainResult<()> {
        self.sheltered.mark_sheltered(bundle_id).await?;
        info!(bundle_id, "bundle sheltered");
        Ok(())
    }
}
