//! Bundle metadata returned after a successful download.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the node learned about a bundle after downloading it from a holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    pub bundle_id: String,
    #[serde(default)]
    pub uploader_id: Option<String>,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub upload_timestamp: Option<i64>,
    #[serde(default)]
    pub storage_period_years: Option<u32>,
}

impl BundleMetadata {
    pub fn new(bundle_id: impl Into<String>) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            uploader_id: None,
            size_bytes: 0,
            upload_timestamp: None,
            storage_period_years: None,
        }
    }
}

/// A bundle this node has taken responsibility for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelteredBundle {
    pub bundle_id: String,
    pub sheltered_at: DateTime<Utc>,
}
