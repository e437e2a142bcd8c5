//! Shared utilities for integration tests.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use tcp_balancer::backend::{BackendRegistry, ConnectionMetrics, Endpoint, QueueTracker};
use tcp_balancer::config::{DynamicConfig, ForwarderConfig};
use tcp_balancer::drain::DrainController;
use tcp_balancer::health::HealthChecker;
use tcp_balancer::load_balancer::provider::StrategyProvider;
use tcp_balancer::load_balancer::LoadBalancer;
use tcp_balancer::outage::OutageGate;
use tcp_balancer::proxy::{BalancerService, TcpForwarder};

/// Start an in-process echo upstream that tags its replies, and return
/// its endpoint.
#[allow(dead_code)]
pub async fn start_echo_upstream(tag: &'static str) -> Endpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buffer = [0u8; 1024];
                        loop {
                            match socket.read(&mut buffer).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => {
                                    let reply = format!(
                                        "[{}] {}",
                                        tag,
                                        String::from_utf8_lossy(&buffer[..n])
                                    );
                                    if socket.write_all(reply.as_bytes()).await.is_err() {
                                        break;
                                    }
                                }
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    format!("tcp://127.0.0.1:{}", port).parse().unwrap()
}

/// The full component wiring, assembled the way main.rs assembles it.
/// Not every test reads every field.
#[allow(dead_code)]
pub struct Harness {
    pub registry: Arc<BackendRegistry>,
    pub queue: Arc<QueueTracker>,
    pub metrics: Arc<ConnectionMetrics>,
    pub dynamic: Arc<DynamicConfig>,
    pub drain: Arc<DrainController>,
    pub health: Arc<HealthChecker>,
    pub strategies: Arc<StrategyProvider>,
    pub forwarder: Arc<TcpForwarder>,
    pub outage: Arc<OutageGate>,
    pub service: Arc<BalancerService>,
}

pub fn build_harness(forwarder_config: ForwarderConfig) -> Harness {
    let registry = Arc::new(BackendRegistry::new());
    let queue = Arc::new(QueueTracker::new());
    let metrics = Arc::new(ConnectionMetrics::new());
    let dynamic = Arc::new(DynamicConfig::new("RoundRobin", 1));
    let drain = Arc::new(DrainController::new());
    let health = Arc::new(HealthChecker::new(
        Arc::clone(&registry),
        Arc::clone(&dynamic),
        Arc::clone(&drain),
    ));
    let strategies = Arc::new(StrategyProvider::new(
        Arc::clone(&dynamic),
        Arc::clone(&queue),
    ));
    let balancer = Arc::new(LoadBalancer::new(
        Arc::clone(&health),
        Arc::clone(&strategies),
    ));
    let forwarder = Arc::new(TcpForwarder::new(
        Arc::clone(&queue),
        Arc::clone(&metrics),
        forwarder_config,
    ));
    let outage = Arc::new(OutageGate::new());
    let service = Arc::new(BalancerService::new(
        balancer,
        Arc::clone(&forwarder),
        Arc::clone(&outage),
    ));

    Harness {
        registry,
        queue,
        metrics,
        dynamic,
        drain,
        health,
        strategies,
        forwarder,
        outage,
        service,
    }
}

/// Accept one balancer-side connection and hand back both ends: the
/// stream a client opened and the stream the forwarder would receive.
#[allow(dead_code)]
pub async fn socket_pair() -> (tokio::net::TcpStream, tokio::net::TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let client = tokio::net::TcpStream::connect(addr).await.unwrap();
    let (server_side, _) = listener.accept().await.unwrap();
    (client, server_side)
}
