//! lending-realtime server entry point.
//!
//! Starts the hub and the Axum HTTP server with REST and WebSocket
//! endpoints.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use lending_realtime::api;
use lending_realtime::app_state::AppState;
use lending_realtime::config::{BrokerConfig, LogFormat};
use lending_realtime::hub::Hub;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = BrokerConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting lending-realtime");

    // Start the hub; it lives as long as some handle does
    let (hub, _hub_task) = Hub::spawn(config.hub_intake_capacity);

    // Build router
    let app = api::build_app(AppState::new(hub, &config));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
