//! Web Dashboard Module
//!
//! HTML pages plus the JSON API behind them.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 Dashboard Server                 │
//! ├──────────────────────────────────────────────────┤
//! │  GET  /                       → Dashboard page   │
//! │  GET  /login                  → Login page       │
//! │  GET  /device/{id}            → Device page      │
//! │  GET  /static/*               → Embedded assets  │
//! │  GET  /data/{filename}        → Raw data file    │
//! │  POST /api/login              → Mock login       │
//! │  POST /api/logout             → End session      │
//! │  GET  /api/topology           → Devices + links  │
//! │  GET  /api/devices            → Devices          │
//! │  GET  /api/device/{id}        → One device       │
//! │  PUT  /api/device/{id}/interfaces                │
//! │  PUT  /api/device/{id}/vlans                     │
//! │  PUT  /api/device/{id}/meta                      │
//! │  GET  /api/device/{id}/logs   → Filtered logs    │
//! │  GET  /api/health[z], /api/readyz                │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod pages;
pub mod server;

pub use api::{
    api_router, ApiError, AppState, DeviceResponse, DevicesResponse, ErrorResponse,
    HealthResponse, HealthState, LogsResponse, OkResponse, TopologyResponse,
};
pub use auth::{
    auth_router, require_session, AuthError, Claims, LoginRequest, Session, SessionStore,
    SESSION_COOKIE,
};
pub use config::DashboardConfig;
pub use server::DashboardServer;
