//! Round-robin selection strategy.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::backend::Endpoint;
use crate::load_balancer::{SelectError, SelectionStrategy};

/// Round-robin selector.
///
/// One cursor shared across all callers; each call atomically advances it
/// and takes `cursor mod len`. The unsigned counter wraps on overflow, so
/// the rotation never crashes or skips.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicU64,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStrategy for RoundRobin {
    fn select(&self, candidates: &[Endpoint]) -> Result<Endpoint, SelectError> {
        if candidates.is_empty() {
            return Err(SelectError::NoCandidates);
        }

        let turn = self.cursor.fetch_add(1, Ordering::Relaxed);
        let idx = (turn % candidates.len() as u64) as usize;
        let selected = candidates[idx].clone();

        tracing::debug!(backend = %selected, index = idx, "Round robin selected backend");
        Ok(selected)
    }

    fn name(&self) -> &'static str {
        "RoundRobin"
    }
}
