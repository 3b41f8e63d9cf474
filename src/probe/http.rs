//! HTTP probe implementation.

use std::time::{Duration, Instant};

use super::ProbeError;

/// Outcome of a completed HTTP probe.
#[derive(Debug, Clone, Copy)]
pub struct HttpProbeResult {
    /// Elapsed wall time in milliseconds, including the body transfer.
    pub latency_ms: f64,
    pub status_code: u16,
}

/// Issue a single GET against the given URL.
///
/// The body is read in full so the latency covers the complete transfer,
/// not just the response headers.
pub async fn run_http_probe(url: &str, timeout: Duration) -> Result<HttpProbeResult, ProbeError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProbeError::Network(e.to_string()))?;

    let start = Instant::now();

    let response = client.get(url).send().await.map_err(map_reqwest_error(timeout))?;
    let status_code = response.status().as_u16();

    let _body = response.bytes().await.map_err(map_reqwest_error(timeout))?;

    Ok(HttpProbeResult {
        latency_ms: start.elapsed().as_secs_f64() * 1000.0,
        status_code,
    })
}

fn map_reqwest_error(timeout: Duration) -> impl Fn(reqwest::Error) -> ProbeError {
    move |e| {
        if e.is_timeout() {
            ProbeError::Timeout(timeout)
        } else if e.is_connect() {
            ProbeError::Connection(e.to_string())
        } else {
            ProbeError::Network(e.to_string())
        }
    }
}
