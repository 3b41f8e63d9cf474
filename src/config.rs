//! Configuration module for hostpulse.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::time::Duration;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port for the web server (default: 8080)
    pub http_port: u16,
    /// Path to the SQLite database file (default: "hostpulse.db")
    pub db_path: String,
    /// Per-probe timeout in milliseconds (default: 2000)
    pub probe_timeout_ms: u64,
    /// Seconds between scheduled check cycles (default: 300)
    pub check_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            db_path: "hostpulse.db".to_string(),
            probe_timeout_ms: 2000,
            check_interval_secs: 300,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `HOSTPULSE_HTTP_PORT`: HTTP port (default: 8080)
    /// - `HOSTPULSE_DB_PATH`: Database file path (default: "hostpulse.db")
    /// - `HOSTPULSE_PROBE_TIMEOUT_MS`: Per-probe timeout (default: 2000)
    /// - `HOSTPULSE_CHECK_INTERVAL_SECS`: Check cycle period (default: 300)
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Ok(port_str) = env::var("HOSTPULSE_HTTP_PORT") {
            if let Ok(port) = port_str.parse() {
                cfg.http_port = port;
            }
        }

        if let Ok(db_path) = env::var("HOSTPULSE_DB_PATH") {
            cfg.db_path = db_path;
        }

        if let Ok(timeout_str) = env::var("HOSTPULSE_PROBE_TIMEOUT_MS") {
            if let Ok(timeout) = timeout_str.parse() {
                cfg.probe_timeout_ms = timeout;
            }
        }

        if let Ok(interval_str) = env::var("HOSTPULSE_CHECK_INTERVAL_SECS") {
            if let Ok(interval) = interval_str.parse() {
                cfg.check_interval_secs = interval;
            }
        }

        cfg
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}
