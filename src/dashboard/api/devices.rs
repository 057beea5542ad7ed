//! Device & Topology API
//!
//! Each request loads the whole topology file; writes save it back in full.

use super::{parse_object, ApiError, AppState};
use crate::dashboard::auth::Session;
use crate::topology::{Device, Link};
use axum::{
    body::Bytes,
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// GET /api/topology response
#[derive(Debug, Serialize)]
pub struct TopologyResponse {
    pub ok: bool,
    pub devices: Vec<Device>,
    pub links: Vec<Link>,
}

/// GET /api/devices response
#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    pub ok: bool,
    pub devices: Vec<Device>,
}

/// Single-device response, also returned by every write
#[derive(Debug, Serialize)]
pub struct DeviceResponse {
    pub ok: bool,
    pub device: Device,
}

impl DeviceResponse {
    fn new(device: Device) -> Self {
        Self { ok: true, device }
    }
}

/// List-valued device fields that are replaced wholesale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListField {
    Interfaces,
    Vlans,
}

impl ListField {
    fn key(self) -> &'static str {
        match self {
            Self::Interfaces => "interfaces",
            Self::Vlans => "vlans",
        }
    }

    fn assign(self, device: &mut Device, items: Vec<Value>) {
        match self {
            Self::Interfaces => device.interfaces = Some(Value::Array(items)),
            Self::Vlans => device.vlans = Some(Value::Array(items)),
        }
    }
}

/// GET /api/topology
pub async fn topology_handler(
    State(state): State<AppState>,
) -> Result<Json<TopologyResponse>, ApiError> {
    let topology = state.store.load().await?;

    Ok(Json(TopologyResponse {
        ok: true,
        devices: topology.devices,
        links: topology.links,
    }))
}

/// GET /api/devices
pub async fn devices_handler(
    State(state): State<AppState>,
) -> Result<Json<DevicesResponse>, ApiError> {
    let topology = state.store.load().await?;

    Ok(Json(DevicesResponse {
        ok: true,
        devices: topology.devices,
    }))
}

/// GET /api/device/{id}
pub async fn device_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeviceResponse>, ApiError> {
    let topology = state.store.load().await?;
    let device = topology
        .find_device(&id)
        .cloned()
        .ok_or(ApiError::DeviceNotFound)?;

    Ok(Json(DeviceResponse::new(device)))
}

async fn replace_list(
    state: &AppState,
    operator: &str,
    id: &str,
    body: &[u8],
    field: ListField,
) -> Result<Json<DeviceResponse>, ApiError> {
    let payload = parse_object(body)?;

    let mut topology = state.store.load().await?;
    let device = topology
        .find_device_mut(id)
        .ok_or(ApiError::DeviceNotFound)?;

    let items = match payload.get(field.key()) {
        None => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(_) => {
            return Err(ApiError::Validation(format!("{} must be a list", field.key())));
        }
    };

    let count = items.len();
    field.assign(device, items);
    let updated = device.clone();

    state.store.save(&topology).await?;
    info!(
        "{} replaced {} on device {} ({} entries)",
        operator,
        field.key(),
        id,
        count
    );

    Ok(Json(DeviceResponse::new(updated)))
}

/// PUT /api/device/{id}/interfaces
pub async fn replace_interfaces_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<DeviceResponse>, ApiError> {
    replace_list(&state, &session.username, &id, &body, ListField::Interfaces).await
}

/// PUT /api/device/{id}/vlans
pub async fn replace_vlans_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<DeviceResponse>, ApiError> {
    replace_list(&state, &session.username, &id, &body, ListField::Vlans).await
}

/// PUT /api/device/{id}/meta
///
/// Only hostname, management_ip, location and notes are copied; any other
/// key in the body is ignored.
pub async fn update_meta_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<DeviceResponse>, ApiError> {
    let payload = parse_object(&body)?;

    let mut topology = state.store.load().await?;
    let device = topology
        .find_device_mut(&id)
        .ok_or(ApiError::DeviceNotFound)?;

    let written = device.apply_meta(&payload);
    let updated = device.clone();

    state.store.save(&topology).await?;
    info!(
        "{} updated {} metadata field(s) on device {}",
        session.username, written, id
    );

    Ok(Json(DeviceResponse::new(updated)))
}
