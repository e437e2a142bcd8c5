//! Background removal of drained backends.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::backend::{BackendRegistry, ConnectionMetrics};
use crate::drain::DrainController;

/// Reaper cadence, independent of the health-check interval.
const REAP_INTERVAL: Duration = Duration::from_secs(1);

/// Removes draining backends from the registry once their active session
/// count reaches zero or their drain timeout elapses.
pub struct DrainReaper {
    drain: Arc<DrainController>,
    metrics: Arc<ConnectionMetrics>,
    registry: Arc<BackendRegistry>,
}

impl DrainReaper {
    pub fn new(
        drain: Arc<DrainController>,
        metrics: Arc<ConnectionMetrics>,
        registry: Arc<BackendRegistry>,
    ) -> Self {
        Self {
            drain,
            metrics,
            registry,
        }
    }

    /// Run the reconcile loop until shutdown.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!("Drain reaper started");

        let mut ticker = time::interval(REAP_INTERVAL);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.reap_once(),
                _ = shutdown.recv() => {
                    tracing::info!("Drain reaper received shutdown signal, exiting loop");
                    break;
                }
            }
        }

        tracing::info!("Drain reaper stopped");
    }

    /// One reconcile pass over the drain records.
    fn reap_once(&self) {
        for entry in self.drain.entries() {
            let active = self.metrics.active_for(&entry.endpoint);
            let timeout_hit = entry
                .timeout
                .map(|t| entry.started.elapsed() >= t)
                .unwrap_or(false);

            if active <= 0 || timeout_hit {
                // Already-absent endpoints are tolerated silently; the
                // drain record is cleared regardless.
                if self.registry.remove(&entry.endpoint) {
                    tracing::info!(
                        backend = %entry.endpoint,
                        active,
                        timeout_hit,
                        "Safely removed backend"
                    );
                }
                self.drain.clear(&entry.endpoint);
            }
        }
    }
}
