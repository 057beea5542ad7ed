//! Configuration management

use crate::dashboard::DashboardConfig;
use anyhow::{ensure, Result};
use std::path::PathBuf;

/// Development fallback for the session-signing secret
pub const DEFAULT_SECRET_KEY: &str = "dev-secret";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Topology file (single JSON document or JSON lines)
    pub data_file: PathBuf,

    /// Secret used to sign session tokens
    pub secret_key: String,

    /// HTTP server settings
    pub dashboard: DashboardConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let data_file = std::env::var("DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("devices.txt"));

        ensure!(
            !data_file.as_os_str().is_empty(),
            "DATA_FILE must not be empty"
        );

        let secret_key = std::env::var("SECRET_KEY").unwrap_or_else(|_| {
            tracing::warn!("No SECRET_KEY configured - using development secret");
            DEFAULT_SECRET_KEY.to_string()
        });

        Ok(Self {
            data_file,
            secret_key,
            dashboard: DashboardConfig::from_env(),
        })
    }

    /// Configuration rooted at an explicit data file, server defaults otherwise
    pub fn with_data_file(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            dashboard: DashboardConfig::default(),
        }
    }
}
