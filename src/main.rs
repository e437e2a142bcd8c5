//! Process bootstrap: CLI → config → wiring → run.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use tcp_balancer::admin::{self, AdminState};
use tcp_balancer::backend::{BackendRegistry, ConnectionMetrics, Endpoint, QueueTracker};
use tcp_balancer::config::{load_config, DynamicConfig};
use tcp_balancer::drain::{DrainController, DrainReaper};
use tcp_balancer::health::HealthChecker;
use tcp_balancer::load_balancer::provider::StrategyProvider;
use tcp_balancer::load_balancer::LoadBalancer;
use tcp_balancer::observability;
use tcp_balancer::outage::OutageGate;
use tcp_balancer::proxy::{BalancerService, TcpForwarder};
use tcp_balancer::Shutdown;

#[derive(Parser)]
#[command(name = "tcp-balancer", version, about = "Layer-4 TCP load balancer")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "balancer.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Validation failures abort here, before any listener binds.
    let config = load_config(&args.config)?;

    observability::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tcp-balancer starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        strategy = %config.strategy.0,
        health_check_interval_secs = config.health_check.interval_secs,
        max_concurrent_connections = config.forwarder.max_concurrent_connections,
        "Configuration loaded"
    );

    // Shared components.
    let registry = Arc::new(BackendRegistry::new());
    for raw in &config.backends {
        let endpoint: Endpoint = raw.parse()?;
        registry.add(&endpoint);
    }

    let queue = Arc::new(QueueTracker::new());
    let metrics = Arc::new(ConnectionMetrics::new());
    let dynamic = Arc::new(DynamicConfig::new(
        &config.strategy.0,
        config.health_check.interval_secs,
    ));
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
        config.forwarder.clone(),
    ));
    let outage = Arc::new(OutageGate::new());
    let service = Arc::new(BalancerService::new(
        balancer,
        forwarder,
        Arc::clone(&outage),
    ));

    let shutdown = Shutdown::new();

    // Background loops.
    let health_task = tokio::spawn(Arc::clone(&health).run(shutdown.subscribe()));
    let reaper = Arc::new(DrainReaper::new(
        Arc::clone(&drain),
        Arc::clone(&metrics),
        Arc::clone(&registry),
    ));
    let reaper_task = tokio::spawn(Arc::clone(&reaper).run(shutdown.subscribe()));

    // Admin control surface.
    let admin_task = if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        let state = AdminState {
            registry: Arc::clone(&registry),
            config: Arc::clone(&dynamic),
            strategies: Arc::clone(&strategies),
            drain: Arc::clone(&drain),
            metrics: Arc::clone(&metrics),
            outage: Arc::clone(&outage),
        };
        Some(tokio::spawn(admin::serve(
            listener,
            state,
            shutdown.subscribe(),
        )))
    } else {
        None
    };

    // Accept loop, last: traffic only once everything is wired.
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let service_task = tokio::spawn(Arc::clone(&service).run(listener, shutdown.subscribe()));

    shutdown.listen_for_signals().await;

    let _ = service_task.await;
    let _ = health_task.await;
    let _ = reaper_task.await;
    if let Some(task) = admin_task {
        let _ = task.await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
