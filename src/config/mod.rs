//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BalancerConfig (validated, immutable)
//!     → seeds registry + DynamicConfig at startup
//!
//! At runtime:
//!     admin surface writes dynamic.rs (strategy, interval)
//!     → health checker re-reads interval each cycle
//!     → strategy provider re-resolves on refresh()
//! ```
//!
//! # Design Decisions
//! - The file config is immutable once loaded; only the fields the admin
//!   surface owns (strategy, interval, membership) change at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks and
//!   reports every failure, not just the first

pub mod dynamic;
pub mod loader;
pub mod schema;
pub mod validation;

pub use dynamic::DynamicConfig;
pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, BalancerConfig, ForwarderConfig, HealthCheckConfig, ListenerConfig,
    ObservabilityConfig,
};
pub use validation::{validate_config, ValidationError};
