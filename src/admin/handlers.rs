use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::admin::AdminState;
use crate::backend::{Endpoint, MetricsSnapshot};
use crate::outage::OutageStatus;

#[derive(Serialize)]
pub struct ConfigView {
    pub strategy: String,
    pub health_check_interval_secs: u64,
    pub backends: Vec<String>,
}

#[derive(Deserialize)]
pub struct SafeRemoveRequest {
    pub backend: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

pub async fn get_config(State(state): State<AdminState>) -> Json<ConfigView> {
    Json(ConfigView {
        strategy: state.config.strategy().as_str().to_owned(),
        health_check_interval_secs: state.config.health_check_interval_secs(),
        backends: state
            .registry
            .list()
            .iter()
            .map(|ep| ep.to_string())
            .collect(),
    })
}

pub async fn set_strategy(
    State(state): State<AdminState>,
    Json(strategy): Json<String>,
) -> Json<serde_json::Value> {
    state.config.set_strategy(&strategy);
    state.strategies.refresh();
    Json(json!({ "message": "Strategy updated", "strategy": strategy }))
}

pub async fn set_interval(
    State(state): State<AdminState>,
    Json(seconds): Json<u64>,
) -> Json<serde_json::Value> {
    state.config.set_health_check_interval_secs(seconds);
    Json(json!({ "message": "Health check interval updated", "seconds": seconds }))
}

pub async fn add_backend(
    State(state): State<AdminState>,
    Json(raw): Json<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let endpoint: Endpoint = raw
        .parse()
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid backend: {e}")))?;

    if state.registry.add(&endpoint) {
        Ok(Json(
            json!({ "message": "Backend added", "backend": endpoint.to_string() }),
        ))
    } else {
        Err((StatusCode::CONFLICT, "already exists".to_string()))
    }
}

/// Start a safe removal. New traffic stops immediately; the reaper
/// removes the backend once active connections reach zero or the timeout
/// elapses.
pub async fn safe_remove_backend(
    State(state): State<AdminState>,
    Json(req): Json<SafeRemoveRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let endpoint: Endpoint = req
        .backend
        .parse()
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid backend: {e}")))?;

    let timeout = req
        .timeout_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);
    state.drain.begin_drain(&endpoint, timeout);

    Ok(Json(json!({
        "message": "Safe removal started",
        "backend": endpoint.to_string(),
        "timeout_secs": req.timeout_secs,
    })))
}

pub async fn get_stats(State(state): State<AdminState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

pub async fn get_outage(State(state): State<AdminState>) -> Json<OutageStatus> {
    Json(state.outage.status())
}
