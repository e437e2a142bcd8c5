//! Layer-4 TCP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                TCP BALANCER                   │
//!                    │                                               │
//!   Client ──────────┼─▶ proxy::service ──▶ load_balancer ──┐        │
//!                    │        │                 │           ▼        │
//!                    │        │ (no capacity)   │    proxy::forwarder┼──▶ Upstream
//!                    │        ▼                 │           │        │
//!                    │   outage gate +          │     queue/metrics  │
//!                    │   proxy::refuser         │     accounting     │
//!                    │                          │                    │
//!                    │  ┌───────────────────────┴─────────────────┐  │
//!                    │  │          Background & Control           │  │
//!                    │  │  health checker   drain reaper   admin  │  │
//!                    │  │  (probe loop)     (reconcile)    (HTTP) │  │
//!                    │  └─────────────────────────────────────────┘  │
//!                    └──────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod backend;
pub mod config;
pub mod proxy;

// Traffic management
pub mod drain;
pub mod health;
pub mod load_balancer;
pub mod outage;

// Cross-cutting concerns
pub mod admin;
pub mod lifecycle;
pub mod observability;

pub use config::BalancerConfig;
pub use lifecycle::Shutdown;
