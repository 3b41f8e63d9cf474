//! Rolling-window statistics computed on demand from stored observations.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::db::{DbError, StatsSnapshot, Store};

/// Default statistics window: trailing 24 hours.
pub const DEFAULT_STATS_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Computes per-host statistics over a trailing window.
///
/// Snapshots are never persisted; every call re-reads the observation rows.
/// Counting uses the status column frozen at observation time, so historical
/// uptime stays stable even if classification thresholds change.
pub struct Aggregator {
    store: Arc<Store>,
}

impl Aggregator {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Statistics for a host over a trailing window anchored at now.
    ///
    /// Works for removed hosts too; their history stays in the store.
    pub fn stats(&self, host_id: i64, window: Duration) -> Result<StatsSnapshot, DbError> {
        self.stats_at(host_id, window, Utc::now())
    }

    /// Statistics over the window ending at an explicit anchor time.
    pub fn stats_at(
        &self,
        host_id: i64,
        window: Duration,
        window_end: DateTime<Utc>,
    ) -> Result<StatsSnapshot, DbError> {
        let span = ChronoDuration::from_std(window)
            .unwrap_or_else(|_| ChronoDuration::seconds(DEFAULT_STATS_WINDOW.as_secs() as i64));
        let window_start = window_end - span;

        let observations = self.store.get_observations(host_id, window_start)?;
        let observations: Vec<_> = observations
            .into_iter()
            .filter(|o| o.time <= window_end)
            .collect();

        let sample_count = observations.len() as i64;
        if sample_count == 0 {
            return Ok(StatsSnapshot {
                host_id,
                window_start,
                window_end,
                uptime_pct: 0.0,
                avg_latency_ms: 0.0,
                p95_latency_ms: 0.0,
                sample_count: 0,
            });
        }

        let up_count = observations.iter().filter(|o| o.status.is_up()).count();
        let uptime_pct = round1(up_count as f64 / sample_count as f64 * 100.0);

        // Unreachable samples carry no latency and are excluded from the
        // latency statistics; they still count against uptime above.
        let mut latencies: Vec<f64> = observations.iter().filter_map(|o| o.latency_ms).collect();
        latencies.sort_by(f64::total_cmp);

        let (avg_latency_ms, p95_latency_ms) = if latencies.is_empty() {
            (0.0, 0.0)
        } else {
            let avg = latencies.iter().sum::<f64>() / latencies.len() as f64;
            (round2(avg), percentile(&latencies, 0.95))
        };

        Ok(StatsSnapshot {
            host_id,
            window_start,
            window_end,
            uptime_pct,
            avg_latency_ms,
            p95_latency_ms,
            sample_count,
        })
    }
}

/// Nearest-rank percentile over an ascending-sorted slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (q * sorted.len() as f64).ceil() as usize;
    let idx = rank.saturating_sub(1).min(sorted.len() - 1);
    sorted[idx]
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{HealthStatus, Observation};
    use tempfile::NamedTempFile;

    fn test_aggregator() -> (NamedTempFile, Arc<Store>, Aggregator) {
        let tmp = NamedTempFile::new().unwrap();
        let store = Arc::new(Store::new(tmp.path()).unwrap());
        let aggregator = Aggregator::new(store.clone());
        (tmp, store, aggregator)
    }

    fn append(
        store: &Store,
        host_id: i64,
        time: DateTime<Utc>,
        latency_ms: Option<f64>,
        status: HealthStatus,
    ) {
        store
            .append_observation(&Observation {
                host_id,
                time,
                latency_ms,
                http_status: latency_ms.map(|_| 200),
                status,
            })
            .unwrap();
    }

    #[test]
    fn test_empty_window_returns_zero_snapshot() {
        let (_tmp, _store, aggregator) = test_aggregator();

        let snap = aggregator.stats(1, DEFAULT_STATS_WINDOW).unwrap();
        assert_eq!(snap.sample_count, 0);
        assert_eq!(snap.uptime_pct, 0.0);
        assert_eq!(snap.avg_latency_ms, 0.0);
        assert_eq!(snap.p95_latency_ms, 0.0);
    }

    #[test]
    fn test_uptime_counts_slow_as_up() {
        let (_tmp, store, aggregator) = test_aggregator();
        let now = Utc::now();

        append(&store, 1, now - ChronoDuration::minutes(4), Some(100.0), HealthStatus::Online);
        append(&store, 1, now - ChronoDuration::minutes(3), Some(200.0), HealthStatus::Online);
        append(&store, 1, now - ChronoDuration::minutes(2), Some(900.0), HealthStatus::Slow);
        append(&store, 1, now - ChronoDuration::minutes(1), None, HealthStatus::Offline);

        let snap = aggregator.stats_at(1, DEFAULT_STATS_WINDOW, now).unwrap();
        assert_eq!(snap.sample_count, 4);
        assert_eq!(snap.uptime_pct, 75.0);
        assert_eq!(snap.avg_latency_ms, 400.0);
    }

    #[test]
    fn test_uptime_rounds_to_one_decimal() {
        let (_tmp, store, aggregator) = test_aggregator();
        let now = Utc::now();

        append(&store, 1, now - ChronoDuration::minutes(3), Some(100.0), HealthStatus::Online);
        append(&store, 1, now - ChronoDuration::minutes(2), None, HealthStatus::Offline);
        append(&store, 1, now - ChronoDuration::minutes(1), None, HealthStatus::Offline);

        let snap = aggregator.stats_at(1, DEFAULT_STATS_WINDOW, now).unwrap();
        assert_eq!(snap.uptime_pct, 33.3);
    }

    #[test]
    fn test_avg_excludes_unreachable_samples() {
        let (_tmp, store, aggregator) = test_aggregator();
        let now = Utc::now();

        append(&store, 1, now - ChronoDuration::minutes(2), Some(300.0), HealthStatus::Online);
        append(&store, 1, now - ChronoDuration::minutes(1), None, HealthStatus::Offline);

        let snap = aggregator.stats_at(1, DEFAULT_STATS_WINDOW, now).unwrap();
        assert_eq!(snap.sample_count, 2);
        assert_eq!(snap.avg_latency_ms, 300.0);
        assert_eq!(snap.p95_latency_ms, 300.0);
    }

    #[test]
    fn test_all_unreachable_yields_zero_latency_stats() {
        let (_tmp, store, aggregator) = test_aggregator();
        let now = Utc::now();

        append(&store, 1, now - ChronoDuration::minutes(1), None, HealthStatus::Offline);

        let snap = aggregator.stats_at(1, DEFAULT_STATS_WINDOW, now).unwrap();
        assert_eq!(snap.sample_count, 1);
        assert_eq!(snap.uptime_pct, 0.0);
        assert_eq!(snap.avg_latency_ms, 0.0);
        assert_eq!(snap.p95_latency_ms, 0.0);
    }

    #[test]
    fn test_window_boundary() {
        let (_tmp, store, aggregator) = test_aggregator();
        let now = Utc::now();

        // Just over 24h old: excluded. Just under: included.
        append(
            &store,
            1,
            now - ChronoDuration::hours(24) - ChronoDuration::seconds(1),
            Some(50.0),
            HealthStatus::Online,
        );
        append(
            &store,
            1,
            now - ChronoDuration::hours(24) + ChronoDuration::seconds(1),
            Some(70.0),
            HealthStatus::Online,
        );

        let snap = aggregator.stats_at(1, DEFAULT_STATS_WINDOW, now).unwrap();
        assert_eq!(snap.sample_count, 1);
        assert_eq!(snap.avg_latency_ms, 70.0);
    }

    #[test]
    fn test_stats_idempotent_for_fixed_anchor() {
        let (_tmp, store, aggregator) = test_aggregator();
        let now = Utc::now();

        for i in 0..10 {
            append(
                &store,
                1,
                now - ChronoDuration::minutes(i),
                Some(100.0 + i as f64),
                HealthStatus::Online,
            );
        }

        let first = aggregator.stats_at(1, DEFAULT_STATS_WINDOW, now).unwrap();
        let second = aggregator.stats_at(1, DEFAULT_STATS_WINDOW, now).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_p95_picks_tail_sample() {
        let (_tmp, store, aggregator) = test_aggregator();
        let now = Utc::now();

        for i in 1..=20 {
            append(
                &store,
                1,
                now - ChronoDuration::seconds(i),
                Some(i as f64 * 10.0),
                HealthStatus::Online,
            );
        }

        let snap = aggregator.stats_at(1, DEFAULT_STATS_WINDOW, now).unwrap();
        // Nearest rank over 20 samples of 10..=200: the 19th value.
        assert_eq!(snap.p95_latency_ms, 190.0);
    }
}
