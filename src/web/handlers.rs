//! HTTP request handlers.

use super::AppState;
use crate::db::{Host, Observation};
use crate::registry::RegistryError;
use crate::scheduler::{CycleError, DEFAULT_STATS_WINDOW};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

// ============================================================================
// API: Check
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub results: HashMap<i64, Observation>,
    pub timestamp: DateTime<Utc>,
    pub total_hosts: usize,
}

pub async fn handle_run_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.scheduler.run_cycle().await {
        Ok(results) => {
            let total_hosts = results.len();
            Json(CheckResponse {
                results,
                timestamp: Utc::now(),
                total_hosts,
            })
            .into_response()
        }
        Err(CycleError::InProgress) => {
            (StatusCode::CONFLICT, "Check already in progress").into_response()
        }
    }
}

// ============================================================================
// API: Hosts
// ============================================================================

/// A host together with its most recent observation, if any.
#[derive(Debug, Serialize)]
pub struct HostSummary {
    #[serde(flatten)]
    pub host: Host,
    pub latest: Option<Observation>,
}

pub async fn handle_list_hosts(State(state): State<AppState>) -> impl IntoResponse {
    let summaries: Vec<HostSummary> = state
        .registry
        .list()
        .into_iter()
        .map(|host| {
            let latest = state.store.latest_observation(host.id).unwrap_or_default();
            HostSummary { host, latest }
        })
        .collect();
    Json(summaries)
}

#[derive(Debug, Deserialize)]
pub struct AddHostRequest {
    pub url: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

pub async fn handle_add_host(
    State(state): State<AppState>,
    Json(req): Json<AddHostRequest>,
) -> impl IntoResponse {
    match state.registry.add(&req.url, req.display_name.as_deref()) {
        Ok(host) => (StatusCode::CREATED, Json(host)).into_response(),
        // The caller gets the already-registered host back.
        Err(RegistryError::Duplicate { existing }) => {
            (StatusCode::CONFLICT, Json(existing)).into_response()
        }
        Err(e @ RegistryError::InvalidUrl(_)) => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

pub async fn handle_remove_host(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.registry.remove(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(RegistryError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, "Host not found").into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

// ============================================================================
// API: Stats
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub window_secs: Option<u64>,
}

pub async fn handle_get_stats(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<StatsQuery>,
) -> impl IntoResponse {
    let window = query
        .window_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_STATS_WINDOW);

    // Removed hosts are served too: their history stays in the store.
    match state.aggregator.stats(id, window) {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

// ============================================================================
// API: History
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub since: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub host_id: i64,
    pub since: DateTime<Utc>,
    pub history: Vec<Observation>,
}

pub async fn handle_get_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let since = query
        .since
        .as_ref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc::now() - ChronoDuration::hours(24));

    match state.store.get_observations(id, since) {
        Ok(history) => Json(HistoryResponse {
            host_id: id,
            since,
            history,
        })
        .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
