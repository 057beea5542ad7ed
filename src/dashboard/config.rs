//! Dashboard Configuration
//!
//! Bind address, port and cookie/logging switches for the HTTP server.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Dashboard server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Bind address (default: 0.0.0.0)
    pub bind_addr: IpAddr,
    /// Port number (default: 5000)
    pub port: u16,
    /// Enable request logging
    pub log_requests: bool,
    /// Mark the session cookie `Secure` (requires HTTPS)
    pub secure_cookies: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            log_requests: true,
            secure_cookies: false,
        }
    }
}

impl DashboardConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("NETINV_BIND_ADDR") {
            match addr.parse() {
                Ok(parsed) => config.bind_addr = parsed,
                Err(_) => tracing::warn!("Ignoring invalid NETINV_BIND_ADDR: {}", addr),
            }
        }

        if let Ok(port) = std::env::var("NETINV_PORT") {
            match port.parse() {
                Ok(parsed) => config.port = parsed,
                Err(_) => tracing::warn!("Ignoring invalid NETINV_PORT: {}", port),
            }
        }

        if let Ok(val) = std::env::var("NETINV_LOG_REQUESTS") {
            config.log_requests = val == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("NETINV_SECURE_COOKIES") {
            config.secure_cookies = val == "true" || val == "1";
        }

        config
    }

    /// Check if bound to localhost only
    pub fn is_localhost(&self) -> bool {
        match self.bind_addr {
            IpAddr::V4(addr) => addr.is_loopback(),
            IpAddr::V6(addr) => addr.is_loopback(),
        }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Get the base URL for this server
    pub fn base_url(&self) -> String {
        let scheme = if self.secure_cookies { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.bind_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binds_all_interfaces() {
        let config = DashboardConfig::default();
        assert!(!config.is_localhost());
        assert_eq!(config.port, 5000);
        assert!(!config.secure_cookies);
    }

    #[test]
    fn test_socket_addr() {
        let config = DashboardConfig {
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            ..Default::default()
        };
        let addr = config.socket_addr();
        assert_eq!(addr.port(), 5000);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn test_base_url() {
        let config = DashboardConfig::default();
        assert_eq!(config.base_url(), "http://0.0.0.0:5000");
    }
}
