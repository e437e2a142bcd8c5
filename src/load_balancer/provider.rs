//! Strategy resolution and runtime swapping.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::backend::QueueTracker;
use crate::config::DynamicConfig;
use crate::load_balancer::least_queue::LeastQueue;
use crate::load_balancer::round_robin::RoundRobin;
use crate::load_balancer::SelectionStrategy;

/// Resolves the configured strategy name to an implementation and holds
/// the active one behind an atomically swappable reference, so `current`
/// reads never race with `refresh` writes.
///
/// The strategy objects themselves live for the provider's lifetime (the
/// round-robin cursor survives refreshes); the swap only changes which
/// one is active. ArcSwap cannot hold a bare `Arc<dyn ...>` (fat
/// pointer), hence the extra Arc level.
pub struct StrategyProvider {
    config: Arc<DynamicConfig>,
    round_robin: Arc<RoundRobin>,
    least_queue: Arc<LeastQueue>,
    current: ArcSwap<Arc<dyn SelectionStrategy>>,
}

impl StrategyProvider {
    pub fn new(config: Arc<DynamicConfig>, queue: Arc<QueueTracker>) -> Self {
        let round_robin = Arc::new(RoundRobin::new());
        let least_queue = Arc::new(LeastQueue::new(queue));

        let initial = resolve(&config.strategy(), &round_robin, &least_queue);
        tracing::info!(strategy = initial.name(), "Strategy provider initialised");

        Self {
            config,
            round_robin,
            least_queue,
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// The currently active strategy.
    pub fn current(&self) -> Arc<dyn SelectionStrategy> {
        let guard = self.current.load();
        Arc::clone(&guard)
    }

    /// Re-resolve from the dynamic configuration.
    pub fn refresh(&self) {
        let next = resolve(&self.config.strategy(), &self.round_robin, &self.least_queue);
        tracing::info!(strategy = next.name(), "Strategy changed");
        self.current.store(Arc::new(next));
    }
}

/// Name lookup is case-insensitive; unrecognized names fall back to
/// round-robin.
fn resolve(
    name: &str,
    round_robin: &Arc<RoundRobin>,
    least_queue: &Arc<LeastQueue>,
) -> Arc<dyn SelectionStrategy> {
    if name.eq_ignore_ascii_case("LeastQueue") {
        Arc::clone(least_queue) as Arc<dyn SelectionStrategy>
    } else {
        Arc::clone(round_robin) as Arc<dyn SelectionStrategy>
    }
}
