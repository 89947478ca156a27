use std::sync::Arc;
use std::time::SystemTime;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use semantic::ModelStatus;
use serde_json::json;

use crate::state::ServerState;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Forces the start time to be captured; called once at startup.
pub fn mark_started() {
    once_cell::sync::Lazy::force(&SERVER_START_TIME);
}

/// Health check endpoint (liveness)
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness check endpoint
///
/// A model that has not been loaded yet still counts as ready: it loads on the first request.
/// Once loading has failed every analysis fails, so the probe reports 503.
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let model = state.analyzer.embedder().status();
    let (status, label) = match model {
        ModelStatus::Failed => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
        ModelStatus::Pending | ModelStatus::Ready => (StatusCode::OK, "ready"),
    };

    let body = Json(json!({
        "status": label,
        "service": env!("CARGO_PKG_NAME"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "components": {
            "embedding_model": model.as_str(),
            "embedding_mode": state.config.semantic.mode,
            "generation_api_key": state.config.generation.has_api_key(),
        }
    }));

    (status, body)
}
