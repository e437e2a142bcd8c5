//! Per-endpoint connection metrics.
//!
//! # Responsibilities
//! - Count active and lifetime-total sessions per endpoint
//! - Produce the sorted snapshot served by the admin `/stats` endpoint
//! - Supply the drain reaper with per-endpoint active counts
//!
//! Updates are lock-free atomic increments; the snapshot iterates the live
//! map without stalling writers, so it is consistent-enough rather than a
//! single atomic cut across all endpoints.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

use crate::backend::Endpoint;

#[derive(Debug, Default)]
struct Counter {
    active: AtomicI64,
    total: AtomicU64,
}

/// Per-endpoint rows of a metrics snapshot.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EndpointMetrics {
    pub backend: String,
    pub active: i64,
    pub total: u64,
}

/// Point-in-time view of all endpoint counters plus aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub backends: Vec<EndpointMetrics>,
    pub active_all: i64,
    pub total_all: u64,
}

#[derive(Debug, Default)]
pub struct ConnectionMetrics {
    map: DashMap<String, Arc<Counter>>,
}

impl ConnectionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_session_start(&self, endpoint: &Endpoint) {
        let counter = Arc::clone(
            self.map
                .entry(endpoint.key().to_owned())
                .or_default()
                .value(),
        );
        let active = counter.active.fetch_add(1, Ordering::Relaxed) + 1;
        let total = counter.total.fetch_add(1, Ordering::Relaxed) + 1;

        tracing::debug!(backend = %endpoint, active, total, "Connection started");
    }

    pub fn on_session_end(&self, endpoint: &Endpoint) {
        let Some(counter) = self.map.get(endpoint.key()).map(|c| Arc::clone(c.value())) else {
            return;
        };

        let active = counter.active.fetch_sub(1, Ordering::Relaxed) - 1;
        if active < 0 {
            counter.active.store(0, Ordering::Relaxed);
            tracing::warn!(backend = %endpoint, "Active count went negative; clamped to 0");
        }

        tracing::debug!(backend = %endpoint, active = active.max(0), "Connection ended");
    }

    /// Current active count for one endpoint; unknown endpoints report zero.
    pub fn active_for(&self, endpoint: &Endpoint) -> i64 {
        self.map
            .get(endpoint.key())
            .map(|c| c.active.load(Ordering::Relaxed).max(0))
            .unwrap_or(0)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut backends: Vec<EndpointMetrics> = self
            .map
            .iter()
            .map(|entry| EndpointMetrics {
                backend: entry.key().clone(),
                active: entry.value().active.load(Ordering::Relaxed).max(0),
                total: entry.value().total.load(Ordering::Relaxed),
            })
            .collect();
        backends.sort_by(|a, b| a.backend.cmp(&b.backend));

        let active_all = backends.iter().map(|b| b.active).sum();
        let total_all = backends.iter().map(|b| b.total).sum();

        MetricsSnapshot {
            backends,
            active_all,
            total_all,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ep(s: &str) -> Endpoint {
        s.parse().unwrap()
    }

    #[test]
    fn start_end_pairs_restore_zero_active() {
        let metrics = ConnectionMetrics::new();
        let a = ep("tcp://a:1");

        metrics.on_session_start(&a);
        metrics.on_session_start(&a);
        assert_eq!(metrics.active_for(&a), 2);

        metrics.on_session_end(&a);
        metrics.on_session_end(&a);
        assert_eq!(metrics.active_for(&a), 0);

        let snap = metrics.snapshot();
        assert_eq!(snap.backends[0].total, 2, "total is monotonic");
    }

    #[test]
    fn end_without_start_clamps() {
        let metrics = ConnectionMetrics::new();
        let a = ep("tcp://a:1");

        metrics.on_session_end(&a);
        assert_eq!(metrics.active_for(&a), 0);

        metrics.on_session_start(&a);
        metrics.on_session_end(&a);
        metrics.on_session_end(&a);
        assert_eq!(metrics.active_for(&a), 0);
    }

    #[test]
    fn snapshot_is_sorted_with_aggregates() {
        let metrics = ConnectionMetrics::new();
        metrics.on_session_start(&ep("tcp://b:2"));
        metrics.on_session_start(&ep("tcp://a:1"));
        metrics.on_session_start(&ep("tcp://a:1"));

        let snap = metrics.snapshot();
        let keys: Vec<&str> = snap.backends.iter().map(|b| b.backend.as_str()).collect();
        assert_eq!(keys, vec!["tcp://a:1", "tcp://b:2"]);
        assert_eq!(snap.active_all, 3);
        assert_eq!(snap.total_all, 3);
    }

    #[tokio::test]
    async fn concurrent_sessions_balance_out() {
        let metrics = Arc::new(ConnectionMetrics::new());
        let a = ep("tcp://a:1");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let metrics = Arc::clone(&metrics);
            let a = a.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    metrics.on_session_start(&a);
                    metrics.on_session_end(&a);
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(metrics.active_for(&a), 0);
        assert_eq!(metrics.snapshot().total_all, 400);
    }
}
