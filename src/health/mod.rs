//! Health checking subsystem.
//!
//! # Responsibilities
//! - Periodically probe every registered, non-draining endpoint
//! - Publish an immutable sorted snapshot of the healthy set
//!
//! Each probe cycle is independent: there is no penalty or backoff state,
//! an endpoint is healthy this cycle iff its probe connected this cycle.

pub mod checker;

pub use checker::HealthChecker;
