//! Database model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A monitored host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub id: i64,
    pub url: String,
    pub display_name: String,
    pub added_at: DateTime<Utc>,
}

/// Health classification of a single observation.
///
/// Computed once when the observation is recorded and stored with it, so
/// historical rows keep their original classification even if thresholds
/// change later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Online,
    Slow,
    Offline,
}

impl HealthStatus {
    /// Database string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Online => "online",
            HealthStatus::Slow => "slow",
            HealthStatus::Offline => "offline",
        }
    }

    /// Parse the database string form.
    pub fn parse(s: &str) -> Option<HealthStatus> {
        match s {
            "online" => Some(HealthStatus::Online),
            "slow" => Some(HealthStatus::Slow),
            "offline" => Some(HealthStatus::Offline),
            _ => None,
        }
    }

    /// Whether this status counts toward uptime.
    pub fn is_up(&self) -> bool {
        matches!(self, HealthStatus::Online | HealthStatus::Slow)
    }
}

/// One recorded probe result for a host.
///
/// `latency_ms` is `None` when the host was unreachable (connection failure
/// or timeout); `http_status` is absent in the same case. Rows are
/// append-only and never modified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub host_id: i64,
    pub time: DateTime<Utc>,
    pub latency_ms: Option<f64>,
    pub http_status: Option<u16>,
    pub status: HealthStatus,
}

/// Rolling-window statistics for a host, computed on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub host_id: i64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub uptime_pct: f64,
    pub avg_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub sample_count: i64,
}
