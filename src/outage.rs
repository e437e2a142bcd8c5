//! Outage detection gate.
//!
//! Two states, Healthy and Outage, with logging only on transitions: one
//! warning when the first refusal opens an outage window, one info line
//! when recovery closes it, carrying the window duration and refusal
//! count. Every refusal increments the counter exactly once, including
//! the one that opened the window.

use std::sync::Mutex;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;

#[derive(Debug, Default)]
struct GateState {
    in_outage: bool,
    refused: u64,
    since: Option<Instant>,
    since_unix_secs: Option<u64>,
}

/// Observable gate state, served by the admin surface.
#[derive(Debug, Clone, Serialize)]
pub struct OutageStatus {
    pub in_outage: bool,
    pub since_unix_secs: Option<u64>,
    pub refused: u64,
}

/// Mutations are serialized by the mutex so concurrent refusal/recovery
/// calls always observe a self-consistent state.
#[derive(Debug, Default)]
pub struct OutageGate {
    state: Mutex<GateState>,
}

impl OutageGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a refused connection, opening an outage window if none is
    /// active. Only the opening refusal logs.
    pub fn on_refusal(&self) {
        let mut state = self.state.lock().expect("outage gate poisoned");

        if !state.in_outage {
            state.in_outage = true;
            state.since = Some(Instant::now());
            state.since_unix_secs = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .ok()
                .map(|d| d.as_secs());
            state.refused = 0;
            tracing::warn!("No healthy backends; refusing new connections");
        }

        state.refused += 1;
    }

    /// Close the outage window if one is active; a no-op while healthy.
    pub fn on_recovered(&self) {
        let mut state = self.state.lock().expect("outage gate poisoned");

        if state.in_outage {
            let duration = state.since.map(|s| s.elapsed()).unwrap_or_default();
            tracing::info!(
                duration_secs = duration.as_secs_f64(),
                refused = state.refused,
                "Backends healthy again"
            );
            state.in_outage = false;
            state.refused = 0;
            state.since = None;
            state.since_unix_secs = None;
        }
    }

    pub fn status(&self) -> OutageStatus {
        let state = self.state.lock().expect("outage gate poisoned");
        OutageStatus {
            in_outage: state.in_outage,
            since_unix_secs: state.since_unix_secs,
            refused: state.refused,
        }
    }
}
