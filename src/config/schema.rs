//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! balancer. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};

/// Root configuration for the TCP load balancer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BalancerConfig {
    /// Listener configuration (bind address for forwarded traffic).
    pub listener: ListenerConfig,

    /// Initial upstream endpoints as `tcp://host:port` strings.
    pub backends: Vec<String>,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Selection strategy name (`RoundRobin` or `LeastQueue`).
    pub strategy: StrategyName,

    /// Forwarder limits and timeouts.
    pub forwarder: ForwarderConfig,

    /// Admin control surface settings.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Newtype so the strategy default lives next to the schema.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct StrategyName(pub String);

impl Default for StrategyName {
    fn default() -> Self {
        Self("RoundRobin".to_string())
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address for client traffic (e.g. "[::]:6000" for dual-stack).
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "[::]:6000".to_string(),
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Probe interval in seconds.
    pub interval_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}

/// Forwarder limits and timeouts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwarderConfig {
    /// Maximum concurrent forwarded sessions (admission cap).
    pub max_concurrent_connections: usize,

    /// Per-direction inactivity limit in seconds.
    pub idle_timeout_secs: u64,

    /// Absolute session lifetime cap in seconds.
    pub max_lifetime_secs: u64,

    /// Relay buffer size in bytes.
    pub buffer_size: usize,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            max_concurrent_connections: 100,
            idle_timeout_secs: 15,
            max_lifetime_secs: 300,
            buffer_size: 8192,
        }
    }
}

/// Admin control surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin HTTP listener.
    pub enabled: bool,

    /// Admin bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
