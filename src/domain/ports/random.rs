//! Random index source used for donor selection.

use rand::Rng;

pub trait RandomIndex: Send + Sync {
    /// Uniform index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// Thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomIndex for ThreadRandom {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always picks the first remaining candidate; ledger order becomes
/// selection order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstIndex;

impl RandomIndex for FirstIndex {
    fn pick(&self, _len: usize) -> usize {
        0
    }
}
