//! Participation strategies.

use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult, ResolutionError};
use crate::domain::models::{
    duration_from_secs, BundleMetadata, Proposition, ResolutionConfig, StrategyKind,
};
use crate::domain::ports::ResolutionStrategy;

/// Fetches and resolves everything it is designated for.
#[derive(Debug, Clone, Copy)]
pub struct ResolveAllStrategy {
    retry_timeout: Duration,
}

impl ResolveAllStrategy {
    pub fn new(retry_timeout: Duration) -> Self {
        Self { retry_timeout }
    }
}

impl Default for ResolveAllStrategy {
    fn default() -> Self {
        Self::new(Duration::days(1))
    }
}

#[async_trait]
impl<P: Proposition> ResolutionStrategy<P> for ResolveAllStrategy {
    async fn should_fetch_bundle(&self, _proposition: &P) -> Result<bool, ResolutionError> {
        Ok(true)
    }

    async fn should_resolve(&self, _bundle: &BundleMetadata) -> Result<bool, ResolutionError> {
        Ok(true)
    }

    fn retry_timeout(&self) -> Duration {
        self.retry_timeout
    }
}

/// Observe-only: never downloads, never resolves.
#[derive(Debug, Clone, Copy)]
pub struct ResolveNoneStrategy {
    retry_timeout: Duration,
}

impl ResolveNoneStrategy {
    pub fn new(retry_timeout: Duration) -> Self {
        Self { retry_timeout }
    }
}

#[async_trait]
impl<P: Proposition> ResolutionStrategy<P> for ResolveNoneStrategy {
    async fn should_fetch_bundle(&self, _proposition: &P) -> Result<bool, ResolutionError> {
        Ok(false)
    }

    async fn should_resolve(&self, _bundle: &BundleMetadata) -> Result<bool, ResolutionError> {
        Ok(false)
    }

    fn retry_timeout(&self) -> Duration {
        self.retry_timeout
    }
}

/// Build the configured strategy for one proposition kind.
pub fn strategy_from_config<P: Proposition>(
    config: &ResolutionConfig,
) -> DomainResult<Arc<dyn ResolutionStrategy<P>>> {
    let retry_timeout = duration_from_secs(config.retry_timeout_secs).ok_or_else(|| {
        DomainError::InvalidConfig(format!(
            "retry_timeout_secs {} is out of range",
            config.retry_timeout_secs
        ))
    })?;
    Ok(match config.strategy {
        StrategyKind::ResolveAll => Arc::new(ResolveAllStrategy::new(retry_timeout)),
        StrategyKind::ResolveNone => Arc::new(ResolveNoneStrategy::new(retry_timeout)),
    })
}
