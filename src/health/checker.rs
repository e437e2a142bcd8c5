//! Active health checking.
//!
//! # Responsibilities
//! - Probe candidates with a bounded raw TCP connect
//! - Replace the published healthy set atomically each cycle
//! - Re-read the configured interval every cycle (admin may change it)

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use futures_util::future::join_all;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::time;

use crate::backend::{BackendRegistry, Endpoint};
use crate::config::DynamicConfig;
use crate::drain::DrainController;

/// Upper bound on a single probe connect.
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

pub struct HealthChecker {
    registry: Arc<BackendRegistry>,
    config: Arc<DynamicConfig>,
    drain: Arc<DrainController>,
    healthy: ArcSwap<Vec<Endpoint>>,
}

impl HealthChecker {
    pub fn new(
        registry: Arc<BackendRegistry>,
        config: Arc<DynamicConfig>,
        drain: Arc<DrainController>,
    ) -> Self {
        Self {
            registry,
            config,
            drain,
            healthy: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// The endpoints that passed the most recent probe cycle, sorted by
    /// address. Always a fresh copy; callers can never observe or cause
    /// mutation of the internal set.
    pub fn healthy_backends(&self) -> Vec<Endpoint> {
        self.healthy.load().as_ref().clone()
    }

    /// Run the probe loop until shutdown. Cadence is the configured
    /// interval clamped to at least one second.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!("Health checker started");

        loop {
            self.probe_once().await;

            let delay = self.config.health_check_interval_secs().max(1);
            tokio::select! {
                _ = time::sleep(Duration::from_secs(delay)) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Health checker received shutdown signal, exiting loop");
                    break;
                }
            }
        }

        tracing::info!("Health checker stopped");
    }

    /// Probe all candidates concurrently and swap in the cycle's result.
    async fn probe_once(&self) {
        let candidates: Vec<Endpoint> = self
            .registry
            .list()
            .into_iter()
            .filter(|ep| !self.drain.is_draining(ep))
            .collect();

        let results = join_all(candidates.iter().map(probe)).await;

        let mut healthy: Vec<Endpoint> = candidates
            .iter()
            .zip(results)
            .filter_map(|(ep, ok)| ok.then(|| ep.clone()))
            .collect();
        healthy.sort();

        tracing::info!(
            healthy = healthy.len(),
            total = candidates.len(),
            "Health check complete"
        );

        self.healthy.store(Arc::new(healthy));
    }
}

/// A probe failure only excludes the endpoint for this cycle; it never
/// propagates as an error.
async fn probe(endpoint: &Endpoint) -> bool {
    match time::timeout(PROBE_TIMEOUT, TcpStream::connect(endpoint.authority())).await {
        Ok(Ok(_)) => {
            tracing::debug!(backend = %endpoint, "Backend is healthy");
            true
        }
        Ok(Err(e)) => {
            tracing::debug!(backend = %endpoint, error = %e, "Health probe failed");
            false
        }
        Err(_) => {
            tracing::debug!(backend = %endpoint, "Health probe timed out");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    fn checker(registry: Arc<BackendRegistry>, drain: Arc<DrainController>) -> HealthChecker {
        let config = Arc::new(DynamicConfig::new("RoundRobin", 1));
        HealthChecker::new(registry, config, drain)
    }

    #[tokio::test]
    async fn probe_cycle_keeps_reachable_endpoints() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            loop {
                let _ = listener.accept().await;
            }
        });

        // A port that was just bound and released connects to nothing.
        let dead_port = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };

        let registry = Arc::new(BackendRegistry::new());
        let live: Endpoint = format!("tcp://127.0.0.1:{}", port).parse().unwrap();
        let dead: Endpoint = format!("tcp://127.0.0.1:{}", dead_port).parse().unwrap();
        registry.add(&live);
        registry.add(&dead);

        let checker = checker(registry, Arc::new(DrainController::new()));
        checker.probe_once().await;

        assert_eq!(checker.healthy_backends(), vec![live]);
    }

    #[tokio::test]
    async fn draining_endpoints_are_not_probed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            loop {
                let _ = listener.accept().await;
            }
        });

        let registry = Arc::new(BackendRegistry::new());
        let drain = Arc::new(DrainController::new());
        let ep: Endpoint = format!("tcp://127.0.0.1:{}", port).parse().unwrap();
        registry.add(&ep);
        drain.begin_drain(&ep, None);

        let checker = checker(registry, drain);
        checker.probe_once().await;

        assert!(checker.healthy_backends().is_empty());
    }

    #[tokio::test]
    async fn snapshot_is_a_fresh_copy() {
        let registry = Arc::new(BackendRegistry::new());
        let checker = checker(registry, Arc::new(DrainController::new()));

        let mut snapshot = checker.healthy_backends();
        snapshot.push("tcp://intruder:1".parse().unwrap());

        assert!(checker.healthy_backends().is_empty());
    }
}
