//! Thread-safe in-memory registry of upstream endpoints.
//!
//! # Responsibilities
//! - Track which endpoints exist, keyed by normalized address
//! - Serve sorted membership snapshots to the health checker and admin
//!
//! Membership here is the superset of anything eligible for probing or
//! selection; removal (explicit or reaper-driven) is the end of an
//! endpoint's life.

use dashmap::DashMap;

use crate::backend::Endpoint;

/// Concurrent endpoint registry. Add/remove are boolean outcomes, not
/// failures: "already present" and "not found" are normal results.
#[derive(Debug, Default)]
pub struct BackendRegistry {
    map: DashMap<String, Endpoint>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an endpoint. Returns false if it is already registered.
    pub fn add(&self, endpoint: &Endpoint) -> bool {
        use dashmap::mapref::entry::Entry;

        match self.map.entry(endpoint.key().to_owned()) {
            Entry::Occupied(_) => {
                tracing::debug!(backend = %endpoint, "Backend already exists");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(endpoint.clone());
                tracing::info!(backend = %endpoint, "Added backend");
                true
            }
        }
    }

    /// Remove an endpoint. Returns false if it was not registered.
    pub fn remove(&self, endpoint: &Endpoint) -> bool {
        let removed = self.map.remove(endpoint.key()).is_some();

        if removed {
            tracing::info!(backend = %endpoint, "Removed backend");
        } else {
            tracing::debug!(backend = %endpoint, "Backend not found");
        }

        removed
    }

    pub fn contains(&self, endpoint: &Endpoint) -> bool {
        self.map.contains_key(endpoint.key())
    }

    /// All registered endpoints, sorted by normalized address for
    /// deterministic iteration.
    pub fn list(&self) -> Vec<Endpoint> {
        let mut list: Vec<Endpoint> = self.map.iter().map(|e| e.value().clone()).collect();
        list.sort();
        list
    }
}
