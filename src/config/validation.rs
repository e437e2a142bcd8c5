//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports, intervals, timeouts, buffer size)
//! - Check every endpoint string is a well-formed `tcp://host:port`
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before any listener binds; failures abort startup

use std::net::SocketAddr;

use crate::backend::Endpoint;
use crate::config::schema::BalancerConfig;

/// Strategy names accepted at startup.
pub const RECOGNIZED_STRATEGIES: [&str; 2] = ["RoundRobin", "LeastQueue"];

const SECONDS_PER_DAY: u64 = 86_400;
const MIN_BUFFER_SIZE: usize = 1_024;
const MAX_BUFFER_SIZE: usize = 4_194_304;

/// A single semantic validation failure.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration, collecting every failure.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut failures = Vec::new();

    match config.listener.bind_address.parse::<SocketAddr>() {
        Ok(addr) if addr.port() == 0 => {
            failures.push(ValidationError::new(
                "listener.bind_address",
                "port must be between 1 and 65535",
            ));
        }
        Ok(_) => {}
        Err(_) => {
            failures.push(ValidationError::new(
                "listener.bind_address",
                format!("{:?} is not a valid socket address", config.listener.bind_address),
            ));
        }
    }

    let interval = config.health_check.interval_secs;
    if !(1..=SECONDS_PER_DAY).contains(&interval) {
        failures.push(ValidationError::new(
            "health_check.interval_secs",
            "must be between 1 and 86400 seconds",
        ));
    }

    if !RECOGNIZED_STRATEGIES
        .iter()
        .any(|s| s.eq_ignore_ascii_case(&config.strategy.0))
    {
        failures.push(ValidationError::new(
            "strategy",
            format!(
                "{:?} is not recognized; allowed: {}",
                config.strategy.0,
                RECOGNIZED_STRATEGIES.join(", ")
            ),
        ));
    }

    if config.backends.is_empty() {
        failures.push(ValidationError::new(
            "backends",
            "must contain at least one tcp://host:port endpoint",
        ));
    }
    for (idx, raw) in config.backends.iter().enumerate() {
        if let Err(e) = raw.parse::<Endpoint>() {
            failures.push(ValidationError::new(
                &format!("backends[{}]", idx),
                format!("{:?} is invalid: {}", raw, e),
            ));
        }
    }

    let fwd = &config.forwarder;
    if fwd.max_concurrent_connections == 0 {
        failures.push(ValidationError::new(
            "forwarder.max_concurrent_connections",
            "must be greater than 0",
        ));
    }
    if !(1..=SECONDS_PER_DAY).contains(&fwd.idle_timeout_secs) {
        failures.push(ValidationError::new(
            "forwarder.idle_timeout_secs",
            "must be between 1 and 86400 seconds",
        ));
    }
    if !(1..=SECONDS_PER_DAY).contains(&fwd.max_lifetime_secs) {
        failures.push(ValidationError::new(
            "forwarder.max_lifetime_secs",
            "must be between 1 and 86400 seconds",
        ));
    }
    if fwd.max_lifetime_secs < fwd.idle_timeout_secs {
        failures.push(ValidationError::new(
            "forwarder.max_lifetime_secs",
            "must be greater than or equal to idle_timeout_secs",
        ));
    }
    if !(MIN_BUFFER_SIZE..=MAX_BUFFER_SIZE).contains(&fwd.buffer_size) {
        failures.push(ValidationError::new(
            "forwarder.buffer_size",
            "must be between 1024 and 4194304 bytes",
        ));
    }

    if config.admin.enabled && config.admin.bind_address.parse::<SocketAddr>().is_err() {
        failures.push(ValidationError::new(
            "admin.bind_address",
            format!("{:?} is not a valid socket address", config.admin.bind_address),
        ));
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}
