//! Observability subsystem.
//!
//! Structured logging via `tracing`; the domain counters live in
//! `backend::metrics` and are served by the admin `/stats` endpoint.

pub mod logging;

pub use logging::init_logging;
