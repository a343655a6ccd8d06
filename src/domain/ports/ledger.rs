//! Ledger port for challenge and transfer contracts.

use async_trait::async_trait;
use chrono::Duration;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Proposition, ResolvedEvent, TimedOutEvent, TxReceipt};

/// Contract calls and event queries for one proposition kind.
///
/// Implemented outside this crate by the RPC wrappers of the challenges and
/// transfers contracts. Event feeds are unordered and may contain duplicates
/// or ids opened before `from_block`.
#[async_trait]
pub trait PropositionLedger<P: Proposition>: Send + Sync {
    /// Propositions opened since `from_block`.
    async fn opened_events(&self, from_block: u64) -> DomainResult<Vec<P>>;

    /// Resolutions observed since `from_block`.
    async fn resolved_events(&self, from_block: u64) -> DomainResult<Vec<ResolvedEvent>>;

    /// Timeouts observed since `from_block`.
    async fn timed_out_events(&self, from_block: u64) -> DomainResult<Vec<TimedOutEvent>>;

    /// How long a proposition stays open on the ledger.
    async fn proposition_duration(&self) -> DomainResult<Duration>;

    /// First block that can still hold an open proposition of the given age.
    async fn earliest_relevant_block(&self, duration: Duration) -> DomainResult<u64>;

    /// Address the ledger expects to resolve this proposition right now.
    async fn designated_resolver(&self, proposition: &P) -> DomainResult<String>;

    /// Whether the ledger would still accept a resolution for `id`.
    async fn can_resolve(&self, id: &str) -> DomainResult<bool>;

    /// Send the resolution transaction. Resolving an already resolved
    /// proposition must be rejected by the ledger, never applied twice.
    async fn submit_resolution(&self, proposition: &P) -> DomainResult<TxReceipt>;
}
