//! hostpulse - Host Health Monitoring Service
//!
//! Probes registered hosts over HTTP(S) on a schedule, records every
//! observation, and serves uptime/latency statistics over a JSON API.

mod config;
mod db;
mod probe;
mod registry;
mod scheduler;
mod web;

use config::ServerConfig;
use db::Store;
use registry::HostRegistry;
use scheduler::{Aggregator, Scheduler};
use web::Server;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_HOSTS: &[&str] = &[
    "https://google.com",
    "https://github.com",
    "https://stackoverflow.com",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("hostpulse=info".parse()?))
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    tracing::info!("Starting hostpulse on port {}...", cfg.http_port);
    tracing::info!("Using database at {}", cfg.db_path);

    // Initialize database
    let store = Arc::new(Store::new(&cfg.db_path)?);
    tracing::info!("Database initialized successfully");

    // Load the registered host set
    let registry = Arc::new(HostRegistry::load(store.clone())?);

    // Seed default hosts if none are registered yet
    if registry.list().is_empty() {
        tracing::info!("No hosts registered, seeding defaults");
        for url in DEFAULT_HOSTS {
            if let Err(e) = registry.add(url, None) {
                tracing::warn!("Failed to seed default host {}: {}", url, e);
            }
        }
    }

    // Start the periodic check scheduler
    let scheduler = Arc::new(Scheduler::new(
        registry.clone(),
        store.clone(),
        cfg.probe_timeout(),
    ));
    scheduler.start(cfg.check_interval());

    // Start web server
    let aggregator = Arc::new(Aggregator::new(store.clone()));
    let server = Server::new(cfg, registry, store, scheduler, aggregator);
    server.start().await?;

    Ok(())
}
