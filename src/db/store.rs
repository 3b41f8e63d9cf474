//! SQLite database store implementation.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use super::models::*;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";

/// Database error types.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration error: {0}")]
    Migration(String),
    #[error("Not found")]
    NotFound,
}

/// Thread-safe database store.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Create a new store with the given database path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init()?;
        Ok(store)
    }

    /// Initialize the database with migrations.
    fn init(&self) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(include_str!("../../migrations/000001_init.up.sql"))
            .map_err(|e| DbError::Migration(format!("Migration 1 failed: {}", e)))?;
        Ok(())
    }

    // --- Hosts ---

    /// Add a new host and fill in its assigned ID.
    pub fn add_host(&self, host: &mut Host) -> Result<i64, DbError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO hosts (url, display_name, added_at) VALUES (?1, ?2, ?3)",
            params![
                host.url,
                host.display_name,
                host.added_at.format(TIME_FORMAT).to_string(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        host.id = id;
        Ok(id)
    }

    /// Get all hosts in insertion order.
    pub fn get_hosts(&self) -> Result<Vec<Host>, DbError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, url, display_name, added_at FROM hosts ORDER BY id ASC")?;

        let hosts = stmt
            .query_map([], |row| {
                let added_str: String = row.get(3)?;
                Ok(Host {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    display_name: row.get(2)?,
                    added_at: parse_db_time(&added_str).unwrap_or_else(Utc::now),
                })
            })?
            .collect::<SqlResult<Vec<_>>>()?;

        Ok(hosts)
    }

    /// Delete a host row.
    ///
    /// Observation rows are intentionally left in place so history for a
    /// removed host stays queryable.
    pub fn delete_host(&self, id: i64) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        let affected = conn.execute("DELETE FROM hosts WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    // --- Observations ---

    /// Append a single observation.
    pub fn append_observation(&self, obs: &Observation) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO observations (host_id, time, latency_ms, http_status, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                obs.host_id,
                obs.time.format(TIME_FORMAT).to_string(),
                obs.latency_ms,
                obs.http_status.map(|s| s as i64),
                obs.status.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Get observations for a host since a cutoff, ascending by time.
    pub fn get_observations(
        &self,
        host_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<Observation>, DbError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT host_id, time, latency_ms, http_status, status FROM observations
             WHERE host_id = ?1 AND time >= ?2 ORDER BY time ASC",
        )?;

        let observations = stmt
            .query_map(
                params![host_id, since.format(TIME_FORMAT).to_string()],
                row_to_observation,
            )?
            .collect::<SqlResult<Vec<_>>>()?;

        Ok(observations)
    }

    /// Get the most recent observation for a host, if any.
    pub fn latest_observation(&self, host_id: i64) -> Result<Option<Observation>, DbError> {
        let conn = self.conn.lock().unwrap();
        let obs = conn
            .query_row(
                "SELECT host_id, time, latency_ms, http_status, status FROM observations
                 WHERE host_id = ?1 ORDER BY time DESC LIMIT 1",
                params![host_id],
                row_to_observation,
            )
            .optional()?;
        Ok(obs)
    }
}

fn row_to_observation(row: &rusqlite::Row<'_>) -> SqlResult<Observation> {
    let time_str: String = row.get(1)?;
    let status_str: String = row.get(4)?;
    Ok(Observation {
        host_id: row.get(0)?,
        time: parse_db_time(&time_str).unwrap_or_else(Utc::now),
        latency_ms: row.get(2)?,
        http_status: row.get::<_, Option<i64>>(3)?.map(|s| s as u16),
        status: HealthStatus::parse(&status_str).unwrap_or(HealthStatus::Offline),
    })
}

/// Parse a datetime string from the database.
fn parse_db_time(s: &str) -> Option<DateTime<Utc>> {
    let formats = [
        "%Y-%m-%d %H:%M:%S%.9f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];

    for fmt in &formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(DateTime::from_naive_utc_and_offset(dt, Utc));
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    None
}
