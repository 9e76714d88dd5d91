//! Server initialization and routing
//!
//! This module handles the Axum server setup:
//! - Router configuration for the search endpoints
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::metrics::TracingMetrics;
use crate::routes::{not_found, search};
use crate::state::ServerState;
use axum::routing::post;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;

/// Build the Axum router
///
/// - `POST /search`
/// - `POST /search/suggestions`
/// - anything else falls through to a JSON 404
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/search", post(search::search))
        .route("/search/suggestions", post(search::suggestions))
        .fallback(not_found)
        .with_state(state)
}

/// Start the docsearch HTTP server
///
/// Initializes JSON logging, installs the tracing-backed query metrics, builds
/// the search service (loading the configured YAML and seed file), and serves
/// until SIGTERM or Ctrl+C.
///
/// # Example
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .json()
        .init();

    docsearch::set_query_metrics(Some(Arc::new(TracingMetrics)));

    let state = Arc::new(ServerState::new(config)?);
    let indexes = state.service.store().list_indexes()?.len();
    let addr: SocketAddr = state.config.socket_addr()?;
    let app = build_router(state);

    tracing::info!(%addr, indexes, "starting docsearch server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
