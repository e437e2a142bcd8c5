//! Upstream endpoint bookkeeping.
//!
//! # Data Flow
//! ```text
//! Admin/config add → registry.rs (normalized membership)
//!     → health checker probes registry minus draining
//!     → forwarder sessions update queue.rs + metrics.rs per endpoint
//!     → drain reaper reads metrics.rs to decide removal
//! ```
//!
//! # Design Decisions
//! - Endpoint identity is its normalized `tcp://host:port` string
//! - Keyed maps are concurrent; no coarse lock around membership or counters
//! - Counts clamp at zero rather than going negative under racy teardown

pub mod endpoint;
pub mod metrics;
pub mod queue;
pub mod registry;

pub use endpoint::Endpoint;
pub use metrics::{ConnectionMetrics, MetricsSnapshot};
pub use queue::QueueTracker;
pub use registry::BackendRegistry;
