//! netinv
//!
//! Network topology inventory: devices, links, interfaces, VLANs and mock
//! device logs kept in a single flat file, served over HTTP behind a mock
//! login.
//!
//! # Architecture
//!
//! ```text
//! Browser ──► Pages / JSON API ──► TopologyStore ──► devices.txt
//!                  │                  (load/save whole file per request)
//!                  ├── SessionStore (mock login, signed cookie)
//!                  └── LogFilter (level + time window)
//! ```

pub mod config;
pub mod dashboard;
pub mod logs;
pub mod store;
pub mod topology;

pub use config::Config;
pub use dashboard::{AppState, DashboardConfig, DashboardServer, Session, SessionStore};
pub use logs::{filter_logs, parse_timestamp, LogFilter, LogQuery};
pub use store::{StoreError, StoreFormat, TopologyStore};
pub use topology::{Device, DeviceId, Link, LogEntry, MetaField, Topology};
