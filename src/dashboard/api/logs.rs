//! Device Log API
//!
//! `GET /api/device/{id}/logs?level=&since=&until=` over the log entries
//! embedded in a device record.

use super::{ApiError, AppState};
use crate::logs::{LogFilter, LogQuery};
use crate::topology::LogEntry;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use tracing::debug;

/// Filtered log response
#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub ok: bool,
    pub logs: Vec<LogEntry>,
}

/// GET /api/device/{id}/logs
pub async fn device_logs_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LogQuery>,
) -> Result<Json<LogsResponse>, ApiError> {
    let topology = state.store.load().await?;
    let device = topology.find_device(&id).ok_or(ApiError::DeviceNotFound)?;

    let entries = device.log_entries();
    let filter = LogFilter::from_query(&query);
    let logs = filter.apply(&entries);
    debug!(
        "Device {} logs: {} of {} match {:?}",
        id,
        logs.len(),
        entries.len(),
        filter
    );

    Ok(Json(LogsResponse { ok: true, logs }))
}
