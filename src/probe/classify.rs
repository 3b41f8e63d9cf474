//! Health classification policy.

use crate::db::HealthStatus;

/// Latency below this classifies as online.
pub const ONLINE_MAX_MS: f64 = 500.0;
/// Latency at or above this classifies as offline, matching the default
/// probe timeout cutoff. Slow covers [ONLINE_MAX_MS, OFFLINE_MIN_MS) only.
pub const OFFLINE_MIN_MS: f64 = 2000.0;

/// Classify a probe outcome.
///
/// Pure and total: every (latency, status) pair maps to exactly one variant.
/// An unreachable host (no latency) or a non-2xx/3xx response is offline
/// regardless of timing.
pub fn classify(latency_ms: Option<f64>, http_status: Option<u16>) -> HealthStatus {
    let latency = match latency_ms {
        Some(l) => l,
        None => return HealthStatus::Offline,
    };

    match http_status {
        Some(code) if (200..400).contains(&code) => {}
        _ => return HealthStatus::Offline,
    }

    if latency < ONLINE_MAX_MS {
        HealthStatus::Online
    } else if latency < OFFLINE_MIN_MS {
        HealthStatus::Slow
    } else {
        HealthStatus::Offline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_boundaries() {
        assert_eq!(classify(Some(0.0), Some(200)), HealthStatus::Online);
        assert_eq!(classify(Some(499.0), Some(200)), HealthStatus::Online);
        assert_eq!(classify(Some(499.9), Some(200)), HealthStatus::Online);
        assert_eq!(classify(Some(500.0), Some(200)), HealthStatus::Slow);
        assert_eq!(classify(Some(1999.0), Some(200)), HealthStatus::Slow);
        assert_eq!(classify(Some(1999.9), Some(200)), HealthStatus::Slow);
        assert_eq!(classify(Some(2000.0), Some(200)), HealthStatus::Offline);
        assert_eq!(classify(Some(10_000.0), Some(200)), HealthStatus::Offline);
    }

    #[test]
    fn test_unreachable_is_offline() {
        assert_eq!(classify(None, None), HealthStatus::Offline);
        // A status with no latency cannot happen in practice, but the
        // function is total over its inputs.
        assert_eq!(classify(None, Some(200)), HealthStatus::Offline);
    }

    #[test]
    fn test_status_code_gate() {
        assert_eq!(classify(Some(50.0), Some(200)), HealthStatus::Online);
        assert_eq!(classify(Some(50.0), Some(204)), HealthStatus::Online);
        assert_eq!(classify(Some(50.0), Some(301)), HealthStatus::Online);
        assert_eq!(classify(Some(50.0), Some(404)), HealthStatus::Offline);
        assert_eq!(classify(Some(50.0), Some(500)), HealthStatus::Offline);
        assert_eq!(classify(Some(50.0), Some(199)), HealthStatus::Offline);
        assert_eq!(classify(Some(50.0), None), HealthStatus::Offline);
    }

    #[test]
    fn test_slow_status_code_still_gated() {
        assert_eq!(classify(Some(800.0), Some(200)), HealthStatus::Slow);
        assert_eq!(classify(Some(800.0), Some(503)), HealthStatus::Offline);
    }
}
