//! Outcomes of resolution attempts.

use serde::Serialize;

use crate::domain::errors::ResolutionError;

/// Why a proposition was deliberately left alone this tick. None of these
/// record a backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A previous attempt failed and its backoff window is still open.
    RecentlyFailed,
    /// The ledger no longer accepts a resolution for this proposition.
    AlreadyClosed,
    /// Another node is the designated resolver.
    NotOurTurn,
    /// The strategy declined before downloading.
    FetchDeclined,
    /// The strategy declined after inspecting the bundle.
    ResolveDeclined,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecentlyFailed => "recently_failed",
            Self::AlreadyClosed => "already_closed",
            Self::NotOurTurn => "not_our_turn",
            Self::FetchDeclined => "fetch_declined",
            Self::ResolveDeclined => "resolve_declined",
        }
    }
}

/// Result of processing one proposition.
#[derive(Debug)]
pub enum ResolutionOutcome {
    Resolved,
    Skipped(SkipReason),
    Failed(ResolutionError),
}

impl ResolutionOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

/// Tally of one resolution batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Open propositions after reconciliation.
    pub open: usize,
    /// Propositions actually processed; `resolve_one` stops early.
    pub attempted: usize,
    pub resolved: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn record(&mut self, outcome: &ResolutionOutcome) {
        self.attempted += 1;
        match outcome {
            ResolutionOutcome::Resolved => self.resolved += 1,
            ResolutionOutcome::Skipped(_) => self.skipped += 1,
            ResolutionOutcome::Failed(_) => self.failed += 1,
        }
    }
}
