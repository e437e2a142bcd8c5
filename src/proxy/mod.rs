//! TCP forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! service.rs accept loop
//!     → LoadBalancer::select_backend()
//!         ├─ Ok(endpoint) → forwarder.rs (admission, connect, relay)
//!         └─ NoHealthyBackends → outage gate + refuser.rs (RST/FIN)
//! ```
//!
//! # Design Decisions
//! - Each accepted connection runs on its own task, never serialized
//!   behind the accept loop
//! - Queue/metrics accounting is paired: both counters move iff the
//!   upstream connect succeeded
//! - The relay is two racing loops; first to finish ends the session

pub mod forwarder;
pub mod refuser;
pub mod service;

pub use forwarder::TcpForwarder;
pub use refuser::{refuse, RefusalMode};
pub use service::BalancerService;
