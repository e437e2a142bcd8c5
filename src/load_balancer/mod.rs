//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! accept loop → LoadBalancer::select_backend()
//!     → health checker (sorted healthy snapshot)
//!     → provider.rs (currently active strategy)
//!     → Apply selection algorithm:
//!         - round_robin.rs (shared rotating cursor)
//!         - least_queue.rs (fewest in-flight sessions)
//!     → Return endpoint or typed no-capacity error
//! ```
//!
//! # Design Decisions
//! - Strategies are pure functions over the candidate list; the queue
//!   tracker holds the state least-queue consults
//! - An empty healthy set is a distinct error kind, driving the refusal
//!   path rather than general error logging
//! - The active strategy is swapped atomically at runtime; readers never
//!   observe a half-updated reference

pub mod least_queue;
pub mod provider;
pub mod round_robin;

use std::sync::Arc;

use crate::backend::Endpoint;
use crate::health::HealthChecker;
use crate::load_balancer::provider::StrategyProvider;

/// Errors from backend selection.
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    /// The healthy set is empty; callers refuse the client instead of
    /// treating this as an unexpected failure.
    #[error("no healthy backends available")]
    NoHealthyBackends,

    /// A strategy was invoked with an empty candidate list. Callers must
    /// guarantee non-empty input, so this is a contract violation.
    #[error("no candidate backends provided")]
    NoCandidates,
}

/// A backend selection algorithm.
///
/// Implementations receive an ordered, non-empty candidate list; order
/// matters for round-robin cycling and least-queue tie breaking, so
/// callers pass the already-sorted healthy snapshot.
pub trait SelectionStrategy: Send + Sync {
    fn select(&self, candidates: &[Endpoint]) -> Result<Endpoint, SelectError>;

    /// Strategy name, for logging.
    fn name(&self) -> &'static str;
}

/// Orchestrates health lookup and strategy selection into a single
/// "pick one endpoint" operation.
pub struct LoadBalancer {
    health: Arc<HealthChecker>,
    strategies: Arc<StrategyProvider>,
}

impl LoadBalancer {
    pub fn new(health: Arc<HealthChecker>, strategies: Arc<StrategyProvider>) -> Self {
        Self { health, strategies }
    }

    /// Pick a healthy endpoint using the active strategy.
    pub fn select_backend(&self) -> Result<Endpoint, SelectError> {
        let healthy = self.health.healthy_backends();

        if healthy.is_empty() {
            tracing::debug!("No healthy backends available to select");
            return Err(SelectError::NoHealthyBackends);
        }

        let strategy = self.strategies.current();
        let selected = strategy.select(&healthy)?;
        tracing::debug!(backend = %selected, strategy = strategy.name(), "Selected backend");
        Ok(selected)
    }
}
