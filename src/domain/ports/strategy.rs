//! Participation strategy port.

use async_trait::async_trait;
use chrono::Duration;

use crate::domain::errors::ResolutionError;
use crate::domain::models::{BundleMetadata, Proposition};

/// Policy consulted by the resolver at each decision point.
///
/// A `false` answer is a deliberate decision and never records a backoff;
/// an `Err` is a failure and does.
#[async_trait]
pub trait ResolutionStrategy<P: Proposition>: Send + Sync {
    /// Asked before anything is downloaded.
    async fn should_fetch_bundle(&self, proposition: &P) -> Result<bool, ResolutionError>;

    /// Asked with the downloaded bundle's metadata.
    async fn should_resolve(&self, bundle: &BundleMetadata) -> Result<bool, ResolutionError>;

    /// Side-effecting hook run after a committed resolution.
    async fn after_resolution(&self, _proposition: &P) -> Result<(), ResolutionError> {
        Ok(())
    }

    /// How long a failed proposition is left alone.
    fn retry_timeout(&self) -> Duration;
}
