//! Challenge and transfer domain models.
//!
//! A proposition is a single on-ledger proof-of-storage obligation. Challenges
//! ask new shelterers to prove they hold a freshly uploaded bundle; transfers
//! ask a replacement shelterer to take a bundle over from a leaving donor. Both
//! are recomputed every tick from ledger events and never persisted.

use std::cmp::Ordering;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// Position of an event in the ledger; the total order for processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerPosition {
    pub block_number: u64,
    pub log_index: u64,
}

impl LedgerPosition {
    pub const fn new(block_number: u64, log_index: u64) -> Self {
        Self {
            block_number,
            log_index,
        }
    }
}

impl Ord for LedgerPosition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.block_number
            .cmp(&other.block_number)
            .then(self.log_index.cmp(&other.log_index))
    }
}

impl PartialOrd for LedgerPosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Kind of proposition, used for logging and worker log details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropositionKind {
    Challenge,
    Transfer,
}

impl PropositionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Challenge => "challenge",
            Self::Transfer => "transfer",
        }
    }
}

impl std::fmt::Display for PropositionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common view over challenges and transfers.
///
/// The resolution algorithm is written once against this trait; each model
/// maps its own field names onto it.
pub trait Proposition: Clone + Debug + Send + Sync + 'static {
    /// Which kind of proposition this is.
    const KIND: PropositionKind;

    /// Ledger-assigned identifier.
    fn id(&self) -> &str;

    /// Address of the node expected to currently hold the bundle.
    fn holder(&self) -> &str;

    /// Content-addressed bundle identifier.
    fn bundle_id(&self) -> &str;

    /// Number of resolution slots opened on the ledger.
    fn count(&self) -> u32;

    /// Ordering coordinates of the opening event.
    fn position(&self) -> LedgerPosition;
}

/// A challenge opened for a bundle held by `shelterer_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub challenge_id: String,
    pub shelterer_id: String,
    pub bundle_id: String,
    pub count: u32,
    pub block_number: u64,
    pub log_index: u64,
}

impl Challenge {
    pub fn new(
        challenge_id: impl Into<String>,
        shelterer_id: impl Into<String>,
        bundle_id: impl Into<String>,
        count: u32,
        block_number: u64,
    ) -> Self {
        Self {
            challenge_id: challenge_id.into(),
            shelterer_id: shelterer_id.into(),
            bundle_id: bundle_id.into(),
            count,
            block_number,
            log_index: 0,
        }
    }

    pub fn with_log_index(mut self, log_index: u64) -> Self {
        self.log_index = log_index;
        self
    }
}

impl Proposition for Challenge {
    const KIND: PropositionKind = PropositionKind::Challenge;

    fn id(&self) -> &str {
        &self.challenge_id
    }

    fn holder(&self) -> &str {
        &self.shelterer_id
    }

    fn bundle_id(&self) -> &str {
        &self.bundle_id
    }

    fn count(&self) -> u32 {
        self.count
    }

    fn position(&self) -> LedgerPosition {
        LedgerPosition::new(self.block_number, self.log_index)
    }
}

/// A transfer requested by `donor_id`, who wants to stop sheltering a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub transfer_id: String,
    pub donor_id: String,
    pub bundle_id: String,
    pub block_number: u64,
    pub log_index: u64,
}

impl Transfer {
    pub fn new(
        transfer_id: impl Into<String>,
        donor_id: impl Into<String>,
        bundle_id: impl Into<String>,
        block_number: u64,
    ) -> Self {
        Self {
            transfer_id: transfer_id.into(),
            donor_id: donor_id.into(),
            bundle_id: bundle_id.into(),
            block_number,
            log_index: 0,
        }
    }

    pub fn with_log_index(mut self, log_index: u64) -> Self {
        self.log_index = log_index;
        self
    }
}

impl Proposition for Transfer {
    const KIND: PropositionKind = PropositionKind::Transfer;

    fn id(&self) -> &str {
        &self.transfer_id
    }

    fn holder(&self) -> &str {
        &self.donor_id
    }

    fn bundle_id(&self) -> &str {
        &self.bundle_id
    }

    // A transfer is taken over by exactly one new shelterer.
    fn count(&self) -> u32 {
        1
    }

    fn position(&self) -> LedgerPosition {
        LedgerPosition::new(self.block_number, self.log_index)
    }
}

/// A resolution observed on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEvent {
    pub id: String,
    pub resolver: String,
    pub block_number: u64,
}

impl ResolvedEvent {
    pub fn new(id: impl Into<String>, resolver: impl Into<String>, block_number: u64) -> Self {
        Self {
            id: id.into(),
            resolver: resolver.into(),
            block_number,
        }
    }
}

/// A proposition that expired without being fully resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedOutEvent {
    pub id: String,
    pub block_number: u64,
}

impl TimedOutEvent {
    pub fn new(id: impl Into<String>, block_number: u64) -> Self {
        Self {
            id: id.into(),
            block_number,
        }
    }
}

/// Receipt of a submitted ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub transaction_hash: String,
    pub block_number: u64,
}

/// Compare two ledger addresses. Hex addresses may differ in checksum casing.
pub fn same_address(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}
