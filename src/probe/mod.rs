//! Probe module: one HTTP GET per host, converted into an observation.

mod classify;
mod http;

pub use classify::*;
pub use http::*;

use chrono::Utc;
use std::time::Duration;
use thiserror::Error;

use crate::db::{Host, Observation};

/// Probe error types.
///
/// These are expected outcomes of probing an unhealthy host; they become
/// unreachable observations rather than surfacing as failures.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("network error: {0}")]
    Network(String),
}

/// Probe a host once and record the outcome.
///
/// A completed request yields the measured latency and status code; a
/// timeout or connection failure yields the unreachable sentinel. The health
/// classification is computed here, at observation time, and frozen into the
/// returned row.
pub async fn probe_host(host: &Host, timeout: Duration) -> Observation {
    // Jitter probe starts so a cycle does not open every connection at once.
    let jitter = rand::random::<u64>() % 100;
    tokio::time::sleep(Duration::from_millis(jitter)).await;

    let time = Utc::now();

    let (latency_ms, http_status) = match run_http_probe(&host.url, timeout).await {
        Ok(result) => (Some(result.latency_ms), Some(result.status_code)),
        Err(e) => {
            tracing::debug!("Probe failed for {}: {}", host.display_name, e);
            (None, None)
        }
    };

    Observation {
        host_id: host.id,
        time,
        latency_ms,
        http_status,
        status: classify(latency_ms, http_status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::HealthStatus;

    fn host(url: &str) -> Host {
        Host {
            id: 1,
            url: url.to_string(),
            display_name: "test".to_string(),
            added_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_becomes_offline_observation() {
        let obs = probe_host(&host("http://127.0.0.1:1"), Duration::from_secs(2)).await;
        assert_eq!(obs.host_id, 1);
        assert_eq!(obs.latency_ms, None);
        assert_eq!(obs.http_status, None);
        assert_eq!(obs.status, HealthStatus::Offline);
    }
}
