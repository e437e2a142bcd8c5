//! Least-queue selection strategy.

use std::sync::Arc;

use crate::backend::{Endpoint, QueueTracker};
use crate::load_balancer::{SelectError, SelectionStrategy};

/// Selects the endpoint with the fewest in-flight sessions.
///
/// Single scan of the candidate list; ties go to the first occurrence in
/// input order, not a re-sorted one.
pub struct LeastQueue {
    queue: Arc<QueueTracker>,
}

impl LeastQueue {
    pub fn new(queue: Arc<QueueTracker>) -> Self {
        Self { queue }
    }
}

impl SelectionStrategy for LeastQueue {
    fn select(&self, candidates: &[Endpoint]) -> Result<Endpoint, SelectError> {
        if candidates.is_empty() {
            return Err(SelectError::NoCandidates);
        }

        // min_by_key keeps the first minimum, which preserves input order
        // on ties.
        let selected = candidates
            .iter()
            .min_by_key(|ep| self.queue.queue_len(ep))
            .cloned()
            .expect("candidates checked non-empty");

        tracing::debug!(
            backend = %selected,
            queue = self.queue.queue_len(&selected),
            "Least queue selected backend"
        );
        Ok(selected)
    }

    fn name(&self) -> &'static str {
        "LeastQueue"
    }
}
