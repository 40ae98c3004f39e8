//! labdeck-api: HTTP server for the labdeck dashboard backend.
//!
//! Exposes liveness probes, subnet discovery, scan scheduling, and the
//! topology document store over a JSON API.

pub mod auth;
pub mod error;
mod routes;
pub mod state;

use std::sync::Arc;

use labdeck_core::Settings;
use labdeck_scan::NmapScanner;

use state::AppState;

/// Build the axum Router (useful for testing).
pub fn build_router(state: Arc<AppState>) -> axum::Router {
    routes::build_router(state)
}

/// Start the API server and block until shutdown (Ctrl+C).
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    // Surface the scanner version once at startup. A missing binary is
    // not fatal; scan requests report it per call.
    match NmapScanner::new(&settings.nmap_path).verify().await {
        Ok(version) => tracing::info!(nmap_version = %version, "Nmap verified"),
        Err(e) => tracing::warn!(error = %e, "Nmap unavailable, scan endpoints will fail"),
    }

    let state = Arc::new(AppState::new(&settings)?);

    // Seed the schedule from settings so an env-configured recurring
    // scan starts without an API call.
    state.scheduler.apply(settings.schedule.clone());

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&settings.bind).await?;
    tracing::info!(bind = %settings.bind, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
    }
    tracing::info!("Shutdown signal received");
}
