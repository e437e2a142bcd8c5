//! Safe backend removal (draining).
//!
//! # Data Flow
//! ```text
//! admin safe-remove → controller.rs (mark closed to new traffic)
//!     → health checker skips draining endpoints next cycle
//!     → reaper.rs polls active counts each second
//!     → active == 0 or timeout elapsed → registry removal + record cleared
//! ```
//!
//! In-flight sessions are never severed; draining only stops new traffic.

pub mod controller;
pub mod reaper;

pub use controller::{DrainController, DrainEntry};
pub use reaper::DrainReaper;
