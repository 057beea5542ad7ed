//! Health Check API
//!
//! Liveness/readiness probes. Readiness means the topology file can be loaded.

use super::AppState;
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;
use std::time::Instant;

/// Uptime and version, fixed at startup
#[derive(Debug, Clone)]
pub struct HealthState {
    /// Server start time for uptime calculation
    pub start_time: Instant,
    /// Application version
    pub version: &'static str,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    /// Timestamp (RFC 3339)
    pub timestamp: String,
}

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: state.health.version,
        uptime_secs: state.health.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /api/healthz
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /api/readyz - 503 while the topology file is unreadable or malformed
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store.load().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Health routes; state is supplied by the enclosing router
pub fn health_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(liveness))
        .route("/readyz", get(readiness))
}
