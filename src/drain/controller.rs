//! Drain record bookkeeping.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::backend::Endpoint;

/// A backend marked for safe removal.
#[derive(Debug, Clone)]
pub struct DrainEntry {
    pub endpoint: Endpoint,
    pub started: Instant,
    pub timeout: Option<Duration>,
}

/// Tracks backends that are being safely removed. Presence in the map
/// means "closed to new traffic"; the registry itself is untouched until
/// the reaper acts.
#[derive(Debug, Default)]
pub struct DrainController {
    map: DashMap<String, DrainEntry>,
}

impl DrainController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an endpoint as draining. Re-entry overwrites the previous
    /// record and restarts the clock.
    pub fn begin_drain(&self, endpoint: &Endpoint, timeout: Option<Duration>) {
        self.map.insert(
            endpoint.key().to_owned(),
            DrainEntry {
                endpoint: endpoint.clone(),
                started: Instant::now(),
                timeout,
            },
        );
        tracing::info!(backend = %endpoint, timeout_secs = timeout.map(|t| t.as_secs()), "Draining backend");
    }

    pub fn is_draining(&self, endpoint: &Endpoint) -> bool {
        self.map.contains_key(endpoint.key())
    }

    /// Remove the drain record without touching the registry.
    pub fn clear(&self, endpoint: &Endpoint) {
        self.map.remove(endpoint.key());
    }

    /// Snapshot of the current drain records, for the reaper.
    pub fn entries(&self) -> Vec<DrainEntry> {
        self.map.iter().map(|e| e.value().clone()).collect()
    }
}
