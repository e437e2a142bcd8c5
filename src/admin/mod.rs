//! Administrative control surface.
//!
//! A small HTTP API on its own listener. Mutations go through the same
//! interfaces the rest of the system reads: DynamicConfig (strategy,
//! interval), the registry (membership), and the drain controller
//! (safe removal). It never touches forwarded traffic.

pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::backend::{BackendRegistry, ConnectionMetrics};
use crate::config::DynamicConfig;
use crate::drain::DrainController;
use crate::load_balancer::provider::StrategyProvider;
use crate::outage::OutageGate;

use self::handlers::*;

/// Shared state injected into admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub registry: Arc<BackendRegistry>,
    pub config: Arc<DynamicConfig>,
    pub strategies: Arc<StrategyProvider>,
    pub drain: Arc<DrainController>,
    pub metrics: Arc<ConnectionMetrics>,
    pub outage: Arc<OutageGate>,
}

pub fn admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/config", get(get_config))
        .route("/config/strategy", post(set_strategy))
        .route("/config/interval", post(set_interval))
        .route("/backends/add", post(add_backend))
        .route("/backends/safe-remove", post(safe_remove_backend))
        .route("/stats", get(get_stats))
        .route("/outage", get(get_outage))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the admin API until shutdown.
pub async fn serve(
    listener: TcpListener,
    state: AdminState,
    mut shutdown: broadcast::Receiver<()>,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(address = %addr, "Admin API listening");
    }

    axum::serve(listener, admin_router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await
}
