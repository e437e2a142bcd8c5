//! Accept loop wiring selection, forwarding, and refusal together.
//!
//! # Responsibilities
//! - Accept client connections and spawn a task per connection
//! - Drive the outage gate from selection outcomes
//! - Refuse clients immediately when no healthy backend exists
//! - Stop accepting promptly on shutdown; in-flight relays finish on
//!   their own terms

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::time;
use tracing::Instrument;

use crate::load_balancer::{LoadBalancer, SelectError};
use crate::outage::OutageGate;
use crate::proxy::forwarder::TcpForwarder;
use crate::proxy::refuser::{refuse, RefusalMode};

/// Pause after a failed accept to avoid a tight error loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Pause after a refusal to avoid a hot loop during a total outage.
const REFUSAL_BACKOFF: Duration = Duration::from_millis(5);

pub struct BalancerService {
    balancer: Arc<LoadBalancer>,
    forwarder: Arc<TcpForwarder>,
    outage: Arc<OutageGate>,
    refusal_mode: RefusalMode,
}

impl BalancerService {
    pub fn new(
        balancer: Arc<LoadBalancer>,
        forwarder: Arc<TcpForwarder>,
        outage: Arc<OutageGate>,
    ) -> Self {
        Self {
            balancer,
            forwarder,
            outage,
            refusal_mode: RefusalMode::Reset,
        }
    }

    /// Accept clients on the given listener until shutdown.
    pub async fn run(self: Arc<Self>, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) {
        match listener.local_addr() {
            Ok(addr) => tracing::info!(address = %addr, "TCP load balancer listening"),
            Err(_) => tracing::info!("TCP load balancer listening"),
        }

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((client, peer)) => {
                        let service = Arc::clone(&self);
                        tokio::spawn(
                            async move {
                                service.handle_client(client, peer).await;
                            }
                            .instrument(tracing::info_span!("connection", peer = %peer)),
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Accept failed");
                        time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Balancer service received shutdown signal, exiting accept loop");
                    break;
                }
            }
        }
    }

    /// Handle a single client: pick a backend and forward, or refuse.
    /// Nothing here may take down the accept loop.
    async fn handle_client(&self, client: TcpStream, peer: SocketAddr) {
        match self.balancer.select_backend() {
            Ok(backend) => {
                self.outage.on_recovered();
                tracing::info!(peer = %peer, backend = %backend, "Accepted client, forwarding");
                self.forwarder.forward(&backend, client).await;
            }
            Err(SelectError::NoHealthyBackends) => {
                tracing::debug!(peer = %peer, "Backend selection failed; refusing client");
                self.outage.on_refusal();
                refuse(client, self.refusal_mode).await;
                time::sleep(REFUSAL_BACKOFF).await;
            }
            Err(e) => {
                tracing::error!(peer = %peer, error = %e, "Error handling TCP client");
                drop(client);
            }
        }
    }
}
