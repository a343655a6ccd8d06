#![allow(dead_code)]

//! In-memory stand-ins for the ledger collaborators.

use async_trait::async_trait;
use atlas_resolver::domain::errors::{DomainError, DomainResult};
use atlas_resolver::domain::models::{
    same_address, Proposition, ResolvedEvent, TimedOutEvent, TxReceipt,
};
use atlas_resolver::domain::ports::{BundleRegistry, NodeDirectory, PropositionLedger};
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Mutex;

/// Ledger that records submitted resolutions as events, so the next
/// reconciliation sees them.
pub struct InMemoryLedger<P> {
    pub opened: Mutex<Vec<P>>,
    pub resolved: Mutex<Vec<ResolvedEvent>>,
    pub timed_out: Mutex<Vec<TimedOutEvent>>,
    pub designated: Mutex<String>,
    resolver_address: String,
    block: Mutex<u64>,
}

impl<P: Proposition> InMemoryLedger<P> {
    /// `resolver_address` is the address this node submits as, and the
    /// initial designated resolver.
    pub fn new(resolver_address: &str, opened: Vec<P>) -> Self {
        Self {
            opened: Mutex::new(opened),
            resolved: Mutex::new(Vec::new()),
            timed_out: Mutex::new(Vec::new()),
            designated: Mutex::new(resolver_address.to_string()),
            resolver_address: resolver_address.to_string(),
            block: Mutex::new(1_000),
        }
    }

    pub fn set_designated(&self, address: &str) {
        *self.designated.lock().unwrap() = address.to_string();
    }

    pub fn time_out(&self, id: &str) {
        self.timed_out
            .lock()
            .unwrap()
            .push(TimedOutEvent::new(id, 2_000));
    }

    pub fn resolutions_by(&self, address: &str) -> Vec<String> {
        self.resolved
            .lock()
            .unwrap()
            .iter()
            .filter(|e| same_address(&e.resolver, address))
            .map(|e| e.id.clone())
            .collect()
    }

    fn is_open(&self, id: &str) -> bool {
        let Some(count) = self
            .opened
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id() == id)
            .map(Proposition::count)
        else {
            return false;
        };
        if self.timed_out.lock().unwrap().iter().any(|e| e.id == id) {
            return false;
        }
        let resolutions = self.resolved.lock().unwrap().iter().filter(|e| e.id == id).count();
        resolutions < count as usize
    }
}

#[async_trait]
impl<P: Proposition> PropositionLedger<P> for InMemoryLedger<P> {
    async fn opened_events(&self, from_block: u64) -> DomainResult<Vec<P>> {
        Ok(self
            .opened
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.position().block_number >= from_block)
            .cloned()
            .collect())
    }

    async fn resolved_events(&self, _from_block: u64) -> DomainResult<Vec<ResolvedEvent>> {
        Ok(self.resolved.lock().unwrap().clone())
    }

    async fn timed_out_events(&self, _from_block: u64) -> DomainResult<Vec<TimedOutEvent>> {
        Ok(self.timed_out.lock().unwrap().clone())
    }

    async fn proposition_duration(&self) -> DomainResult<Duration> {
        Ok(Duration::days(1))
    }

    async fn earliest_relevant_block(&self, _duration: Duration) -> DomainResult<u64> {
        Ok(0)
    }

    async fn designated_resolver(&self, _proposition: &P) -> DomainResult<String> {
        Ok(self.designated.lock().unwrap().clone())
    }

    async fn can_resolve(&self, id: &str) -> DomainResult<bool> {
        Ok(self.is_open(id))
    }

    async fn submit_resolution(&self, proposition: &P) -> DomainResult<TxReceipt> {
        let already = self
            .resolutions_by(&self.resolver_address)
            .iter()
            .any(|id| id == proposition.id());
        if already || !self.is_open(proposition.id()) {
            return Err(DomainError::Ledger(format!(
                "execution reverted: {} cannot be resolved",
                proposition.id()
            )));
        }

        let block = {
            let mut block = self.block.lock().unwrap();
            *block += 1;
            *block
        };
        self.resolved.lock().unwrap().push(ResolvedEvent::new(
            proposition.id(),
            &self.resolver_address,
            block,
        ));
        Ok(TxReceipt {
            transaction_hash: format!("0x{block:064x}"),
            block_number: block,
        })
    }
}

#[derive(Default)]
pub struct StaticRegistry {
    pub holders: HashMap<String, Vec<String>>,
    pub uploaders: HashMap<String, String>,
}

impl StaticRegistry {
    pub fn with_bundle(mut self, bundle_id: &str, holders: &[&str], uploader: &str) -> Self {
        self.holders.insert(
            bundle_id.to_string(),
            holders.iter().map(ToString::to_string).collect(),
        );
        self.uploaders
            .insert(bundle_id.to_string(), uploader.to_string());
        self
    }
}

#[async_trait]
impl BundleRegistry for StaticRegistry {
    async fn current_holders(&self, bundle_id: &str) -> DomainResult<Vec<String>> {
        Ok(self.holders.get(bundle_id).cloned().unwrap_or_default())
    }

    async fn original_uploader(&self, bundle_id: &str) -> DomainResult<String> {
        self.uploaders
            .get(bundle_id)
            .cloned()
            .ok_or_else(|| DomainError::Ledger(format!("unknown bundle {bundle_id}")))
    }
}

/// Maps node addresses to base URLs.
#[derive(Default)]
pub struct StaticDirectory {
    pub urls: HashMap<String, String>,
}

impl StaticDirectory {
    pub fn with_node(mut self, address: &str, url: &str) -> Self {
        self.urls.insert(address.to_lowercase(), url.to_string());
        self
    }
}

#[async_trait]
impl NodeDirectory for StaticDirectory {
    async fn node_url(&self, address: &str) -> DomainResult<String> {
        self.urls
            .get(&address.to_lowercase())
            .cloned()
            .ok_or_else(|| DomainError::Ledger(format!("no url registered for {address}")))
    }
}
