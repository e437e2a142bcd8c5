//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Seed registry → Spawn loops → Accept
//!
//! Shutdown (shutdown.rs):
//!     SIGINT/SIGTERM → broadcast → loops exit their current wait
//!     → in-flight relay sessions run to their natural end
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
