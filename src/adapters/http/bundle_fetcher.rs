//! Downloads bundle metadata from other nodes over HTTP.

use reqwest::Client as ReqwestClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::errors::DownloadError;
use crate::domain::models::BundleMetadata;
use crate::domain::ports::NodeDirectory;

/// Fetches `GET {node_url}/bundle/{bundle_id}/info` from a holder.
#[derive(Clone)]
pub struct HttpBundleFetcher {
    http_client: ReqwestClient,
    directory: Arc<dyn NodeDirectory>,
}

impl HttpBundleFetcher {
    pub fn new(directory: Arc<dyn NodeDirectory>) -> Self {
        Self::with_client(ReqwestClient::new(), directory)
    }

    pub fn with_client(http_client: ReqwestClient, directory: Arc<dyn NodeDirectory>) -> Self {
        Self {
            http_client,
            directory,
        }
    }

    pub async fn fetch(
        &self,
        bundle_id: &str,
        holder: &str,
        timeout: Duration,
    ) -> Result<BundleMetadata, DownloadError> {
        let base_url = self
            .directory
            .node_url(holder)
            .await
            .map_err(|e| DownloadError::Unreachable(format!("no url for {holder}: {e}")))?;
        let url = format!("{}/bundle/{}/info", base_url.trim_end_matches('/'), bundle_id);

        debug!(bundle_id, holder, url = %url, "downloading bundle");

        let response = self
            .http_client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(&e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus(status.as_u16()));
        }

        let metadata: BundleMetadata = response.json().await.map_err(|e| {
            if e.is_timeout() {
                map_transport_error(&e, timeout)
            } else {
                DownloadError::Validation(format!("undecodable bundle: {e}"))
            }
        })?;

        if metadata.bundle_id != bundle_id {
            return Err(DownloadError::Validation(format!(
                "holder returned bundle {} instead of {}",
                metadata.bundle_id, bundle_id
            )));
        }

        Ok(metadata)
    }
}

fn map_transport_error(err: &reqwest::Error, timeout: Duration) -> DownloadError {
    if err.is_timeout() {
        DownloadError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
    } else {
        DownloadError::Unreachable(err.to_string())
    }
}
