//! Dashboard API Endpoints
//!
//! JSON API consumed by the browser pages. Every body carries an `ok` flag;
//! failures add an `error` message.

pub mod devices;
pub mod health;
pub mod logs;

use crate::dashboard::auth::{auth_router, require_session, SessionStore};
use crate::store::{StoreError, TopologyStore};
use axum::{
    extract::FromRef,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

pub use devices::{DeviceResponse, DevicesResponse, TopologyResponse};
pub use health::{health_router, HealthResponse, HealthState};
pub use logs::LogsResponse;

/// State shared by every dashboard handler
#[derive(Clone)]
pub struct AppState {
    /// Backing topology file
    pub store: Arc<TopologyStore>,
    /// Server-side sessions
    pub sessions: Arc<SessionStore>,
    /// Uptime/version for health checks
    pub health: Arc<HealthState>,
}

impl AppState {
    pub fn new(store: TopologyStore, sessions: SessionStore) -> Self {
        Self {
            store: Arc::new(store),
            sessions: Arc::new(sessions),
            health: Arc::new(HealthState::new()),
        }
    }
}

impl FromRef<AppState> for Arc<SessionStore> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Arc<TopologyStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

/// Error body shared by all API failures
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}

/// Bare success body
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn new() -> Self {
        Self { ok: true }
    }
}

impl Default for OkResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Device not found")]
    DeviceNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Invalid JSON: {0}")]
    MalformedBody(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::DeviceNotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            ApiError::Store(e) => {
                tracing::error!("Topology store failure: {}", e);
                "Failed to access topology store".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Parse a request body as a JSON object.
///
/// An empty body or `null` counts as `{}`.
pub fn parse_object(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::MalformedBody(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(ApiError::Validation(
            "request body must be a JSON object".to_string(),
        )),
    }
}

/// Create the full API router (mounted under `/api`)
///
/// Routes:
/// - POST /login, /logout - Mock session handling
/// - GET /health, /healthz, /readyz - Health probes
/// - GET /topology, /devices, /device/{id} - Reads (session required)
/// - PUT /device/{id}/interfaces, /vlans, /meta - Writes (session required)
/// - GET /device/{id}/logs - Filtered logs (session required)
pub fn api_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/topology", get(devices::topology_handler))
        .route("/devices", get(devices::devices_handler))
        .route("/device/{id}", get(devices::device_handler))
        .route("/device/{id}/interfaces", put(devices::replace_interfaces_handler))
        .route("/device/{id}/vlans", put(devices::replace_vlans_handler))
        .route("/device/{id}/meta", put(devices::update_meta_handler))
        .route("/device/{id}/logs", get(logs::device_logs_handler))
        .route_layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            require_session,
        ));

    Router::new()
        .merge(protected)
        .merge(auth_router())
        .merge(health_router())
        .with_state(state)
}
