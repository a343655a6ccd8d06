//! Backoff memory for propositions whose resolution recently failed.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::ports::{Clock, SystemClock};

/// Maps a proposition id to the moment its backoff window closes.
///
/// An entry whose expiry is not in the future is treated as absent and
/// dropped the next time it is looked up or swept.
pub struct FailedResolutionsCache {
    expiries: HashMap<String, DateTime<Utc>>,
    clock: Arc<dyn Clock>,
}

impl FailedResolutionsCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            expiries: HashMap::new(),
            clock,
        }
    }

    /// Suppress retries of `id` for `ttl`, replacing any earlier window.
    /// A window past the representable range never closes.
    pub fn remember_failed(&mut self, id: &str, ttl: Duration) {
        let expiry = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.expiries.insert(id.to_string(), expiry);
    }

    pub fn did_fail_recently(&mut self, id: &str) -> bool {
        let Some(expiry) = self.expiries.get(id).copied() else {
            return false;
        };
        if expiry > self.clock.now() {
            return true;
        }
        self.expiries.remove(id);
        false
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn clear_outdated(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.expiries.len();
        self.expiries.retain(|_, expiry| *expiry > now);
        before - self.expiries.len()
    }

    pub fn len(&self) -> usize {
        self.expiries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }
}

impl Default for FailedResolutionsCache {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for FailedResolutionsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailedResolutionsCache")
            .field("entries", &self.expiries.len())
            .finish()
    }
}
