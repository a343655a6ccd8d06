//! Reconstructs the set of open challenges or transfers from ledger events.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    same_address, Challenge, Proposition, ResolvedEvent, TimedOutEvent, Transfer,
};
use crate::domain::ports::PropositionLedger;

/// Reduce the three event feeds to the propositions still open, in ledger
/// order.
///
/// A resolution by `node_address` closes the proposition for this node even
/// if other slots remain. A timeout closes it unconditionally. Feeds may be
/// unordered, contain duplicates, or mention ids opened before the window;
/// those are ignored.
pub fn reconcile<P: Proposition>(
    opened: Vec<P>,
    resolved: &[ResolvedEvent],
    timed_out: &[TimedOutEvent],
    node_address: &str,
) -> Vec<P> {
    let mut remaining: HashMap<String, u32> = opened
        .iter()
        .map(|p| (p.id().to_string(), p.count()))
        .collect();

    for event in resolved {
        if let Some(count) = remaining.get_mut(&event.id) {
            if same_address(&event.resolver, node_address) {
                *count = 0;
            } else {
                *count = count.saturating_sub(1);
            }
        }
    }

    let timed_out: HashSet<&str> = timed_out.iter().map(|e| e.id.as_str()).collect();

    let mut open: Vec<P> = opened
        .into_iter()
        .filter(|p| !timed_out.contains(p.id()))
        .filter(|p| remaining.get(p.id()).is_some_and(|count| *count > 0))
        .collect();

    open.sort_by(|a, b| a.position().cmp(&b.position()).then_with(|| a.id().cmp(b.id())));
    let mut seen = HashSet::new();
    open.retain(|p| seen.insert(p.id().to_string()));
    open
}

/// Queries one proposition kind from the ledger and reconciles it.
pub struct PropositionsRepository<P: Proposition> {
    ledger: Arc<dyn PropositionLedger<P>>,
    node_address: String,
}

pub type ChallengesRepository = PropositionsRepository<Challenge>;
pub type TransfersRepository = PropositionsRepository<Transfer>;

impl<P: Proposition> PropositionsRepository<P> {
    pub fn new(ledger: Arc<dyn PropositionLedger<P>>, node_address: impl Into<String>) -> Self {
        Self {
            ledger,
            node_address: node_address.into(),
        }
    }

    pub fn ledger(&self) -> &Arc<dyn PropositionLedger<P>> {
        &self.ledger
    }

    pub fn node_address(&self) -> &str {
        &self.node_address
    }

    /// Propositions still open, oldest first.
    pub async fn ongoing(&self) -> DomainResult<Vec<P>> {
        let duration = self.ledger.proposition_duration().await?;
        let from_block = self.ledger.earliest_relevant_block(duration).await?;

        let (opened, resolved, timed_out) = futures::try_join!(
            self.ledger.opened_events(from_block),
            self.ledger.resolved_events(from_block),
            self.ledger.timed_out_events(from_block),
        )?;

        let opened_count = opened.len();
        let open = reconcile(opened, &resolved, &timed_out, &self.node_address);

        debug!(
            kind = %P::KIND,
            from_block,
            opened = opened_count,
            resolved = resolved.len(),
            timed_out = timed_out.len(),
            open = open.len(),
            "reconciled ledger events"
        );

        Ok(open)
    }
}
