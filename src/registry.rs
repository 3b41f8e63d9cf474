//! In-memory registry of monitored hosts.
//!
//! The registry is the authority on which hosts a check cycle covers. Host
//! rows are written through to the store so the set survives restarts, but
//! reads never touch the database.

use chrono::Utc;
use std::sync::{Arc, RwLock};
use thiserror::Error;

use crate::db::{DbError, Host, Store};

/// Registry error types.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("host already registered: {}", .existing.url)]
    Duplicate { existing: Host },
    #[error("no host with id {0}")]
    NotFound(i64),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Mutable set of monitored hosts.
///
/// Mutation takes the write lock, so a check cycle snapshotting the list
/// never sees a partially-added host.
pub struct HostRegistry {
    store: Arc<Store>,
    hosts: RwLock<Vec<Host>>,
}

impl HostRegistry {
    /// Load the persisted host set into a new registry.
    pub fn load(store: Arc<Store>) -> Result<Self, DbError> {
        let hosts = store.get_hosts()?;
        Ok(Self {
            store,
            hosts: RwLock::new(hosts),
        })
    }

    /// Register a new host.
    ///
    /// The URL is normalized before the duplicate check, so "github.com" and
    /// "https://github.com" are the same host. When no display name is given
    /// the host portion of the URL is used.
    pub fn add(&self, url: &str, display_name: Option<&str>) -> Result<Host, RegistryError> {
        let url = normalize_url(url)?;

        let mut hosts = self.hosts.write().unwrap();
        if let Some(existing) = hosts.iter().find(|h| h.url == url) {
            return Err(RegistryError::Duplicate {
                existing: existing.clone(),
            });
        }

        let display_name = display_name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| host_portion(&url));

        let mut host = Host {
            id: 0,
            url,
            display_name,
            added_at: Utc::now(),
        };
        self.store.add_host(&mut host)?;
        hosts.push(host.clone());

        tracing::info!("Registered host {} ({})", host.display_name, host.url);
        Ok(host)
    }

    /// Remove a host from monitoring.
    ///
    /// Its observation history stays in the store.
    pub fn remove(&self, id: i64) -> Result<(), RegistryError> {
        let mut hosts = self.hosts.write().unwrap();
        let pos = hosts
            .iter()
            .position(|h| h.id == id)
            .ok_or(RegistryError::NotFound(id))?;
        self.store.delete_host(id)?;
        let host = hosts.remove(pos);

        tracing::info!("Removed host {} ({})", host.display_name, host.url);
        Ok(())
    }

    /// Snapshot of all hosts in insertion order.
    pub fn list(&self) -> Vec<Host> {
        self.hosts.read().unwrap().clone()
    }
}

/// Normalize a user-supplied URL: trim whitespace, default to https.
fn normalize_url(raw: &str) -> Result<String, RegistryError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::InvalidUrl("url is empty".to_string()));
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("https://{}", trimmed))
    }
}

/// Host portion of a normalized URL, used as the default display name.
fn host_portion(url: &str) -> String {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    match rest.split('/').next() {
        Some(host) => host.to_string(),
        None => rest.to_string(),
    }
}
