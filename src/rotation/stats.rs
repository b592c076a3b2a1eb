//! Point-in-time health summaries.

use serde::Serialize;

/// Counts for one pool, taken under a single read of the sequence.
///
/// A candidate that is both failed and held counts as failed only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PoolStats {
    /// Number of candidates in the pool.
    pub total: usize,
    /// Candidates that could be selected right now.
    pub available: usize,
    /// Candidates with the sticky failure flag set.
    pub failed: usize,
    /// Candidates not failed but inside a hold window.
    pub held: usize,
}

impl PoolStats {
    /// True if at least one candidate can be selected.
    pub fn is_healthy(&self) -> bool {
        self.available > 0
    }
}
