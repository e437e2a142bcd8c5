//! Per-endpoint in-flight session counter.
//!
//! Feeds the least-queue selection strategy. Decrements clamp at zero so
//! that racy session teardown can never drive a count negative.

use dashmap::DashMap;

use crate::backend::Endpoint;

#[derive(Debug, Default)]
pub struct QueueTracker {
    map: DashMap<String, usize>,
}

impl QueueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, endpoint: &Endpoint) {
        let mut count = self.map.entry(endpoint.key().to_owned()).or_insert(0);
        *count += 1;
        tracing::debug!(backend = %endpoint, queue = *count, "Incremented queue");
    }

    pub fn decrement(&self, endpoint: &Endpoint) {
        let mut count = self.map.entry(endpoint.key().to_owned()).or_insert(0);
        *count = count.saturating_sub(1);
        tracing::debug!(backend = %endpoint, queue = *count, "Decremented queue");
    }

    /// Current in-flight count; unknown endpoints report zero.
    pub fn queue_len(&self, endpoint: &Endpoint) -> usize {
        self.map.get(endpoint.key()).map(|c| *c).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn ep(s: &str) -> Endpoint {
        s.parse().unwrap()
    }

    #[test]
    fn increments_and_decrements() {
        let tracker = QueueTracker::new();
        let a = ep("tcp://a:1");

        tracker.increment(&a);
        tracker.increment(&a);
        assert_eq!(tracker.queue_len(&a), 2);

        tracker.decrement(&a);
        assert_eq!(tracker.queue_len(&a), 1);
    }

    #[test]
    fn decrement_clamps_at_zero() {
        let tracker = QueueTracker::new();
        let a = ep("tcp://a:1");

        tracker.decrement(&a);
        tracker.decrement(&a);
        assert_eq!(tracker.queue_len(&a), 0);
    }

    #[test]
    fn unknown_endpoint_reports_zero() {
        let tracker = QueueTracker::new();
        assert_eq!(tracker.queue_len(&ep("tcp://nowhere:1")), 0);
    }

    #[tokio::test]
    async fn concurrent_updates_net_out() {
        let tracker = Arc::new(QueueTracker::new());
        let a = ep("tcp://a:1");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let tracker = Arc::clone(&tracker);
            let a = a.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    tracker.increment(&a);
                    tracker.decrement(&a);
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(tracker.queue_len(&a), 0);
    }
}
