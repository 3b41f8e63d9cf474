//! Web server module.

mod handlers;

pub use handlers::*;

use crate::config::ServerConfig;
use crate::db::Store;
use crate::registry::HostRegistry;
use crate::scheduler::{Aggregator, Scheduler};

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub registry: Arc<HostRegistry>,
    pub store: Arc<Store>,
    pub scheduler: Arc<Scheduler>,
    pub aggregator: Arc<Aggregator>,
}

/// JSON API server for hostpulse.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server with the given dependencies.
    pub fn new(
        config: ServerConfig,
        registry: Arc<HostRegistry>,
        store: Arc<Store>,
        scheduler: Arc<Scheduler>,
        aggregator: Arc<Aggregator>,
    ) -> Self {
        Self {
            state: AppState {
                config,
                registry,
                store,
                scheduler,
                aggregator,
            },
        }
    }

    /// Build the router with all routes.
    fn routes(&self) -> Router {
        let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

        Router::new()
            .route("/api/check", get(handlers::handle_run_check))
            .route("/api/hosts", get(handlers::handle_list_hosts))
            .route("/api/hosts", post(handlers::handle_add_host))
            .route("/api/hosts/{id}", delete(handlers::handle_remove_host))
            .route("/api/hosts/{id}/stats", get(handlers::handle_get_stats))
            .route("/api/hosts/{id}/history", get(handlers::handle_get_history))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB
            .with_state(self.state.clone())
    }

    /// Start the server on the configured port.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let router = self.routes();

        tracing::info!("Web server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
