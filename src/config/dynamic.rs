//! Runtime-mutable configuration.
//!
//! Holds the two knobs the admin surface may change while the balancer is
//! running: the selection strategy name and the health-check interval.
//! Reads and writes are individually atomic (no torn reads); there is no
//! notification mechanism — consumers re-read on their own schedule, and
//! the strategy provider re-resolves on `refresh()`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

#[derive(Debug)]
pub struct DynamicConfig {
    strategy: ArcSwap<String>,
    interval_secs: AtomicU64,
}

impl DynamicConfig {
    pub fn new(strategy: &str, interval_secs: u64) -> Self {
        Self {
            strategy: ArcSwap::from_pointee(strategy.to_string()),
            interval_secs: AtomicU64::new(interval_secs),
        }
    }

    pub fn strategy(&self) -> Arc<String> {
        self.strategy.load_full()
    }

    pub fn set_strategy(&self, name: &str) {
        self.strategy.store(Arc::new(name.to_string()));
        tracing::info!(strategy = name, "Strategy updated");
    }

    pub fn health_check_interval_secs(&self) -> u64 {
        self.interval_secs.load(Ordering::Relaxed)
    }

    pub fn set_health_check_interval_secs(&self, seconds: u64) {
        self.interval_secs.store(seconds, Ordering::Relaxed);
        tracing::info!(seconds, "Health check interval updated");
    }
}
