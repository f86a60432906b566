//! Relay server setup and initialization

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{routing::any, Router};
use tokio::net::TcpListener;

use crate::config::Config;

use super::relay_handler;
use super::state::RelayState;

/// Start the relay server and serve until shutdown.
pub async fn start_relay(config: Config) -> Result<()> {
    let bind_addr = config.bind_addr;

    // Build the HTTP client with timeout and connection pooling.
    // The timeout bounds the whole outbound call including the body read,
    // so a stalled backend surfaces as a 500 instead of a hung connection.
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream_timeout_secs))
        .pool_max_idle_per_host(10)
        .build()
        .context("Failed to create HTTP client")?;

    let state = RelayState {
        client,
        config: Arc::new(config),
    };

    // Every method on every path goes to the relay handler; the target is
    // carried in the `path` query parameter, not the request path
    let app = Router::new()
        .route("/", any(relay_handler))
        .route("/*path", any(relay_handler))
        .with_state(state);

    tracing::info!("Starting relay on {}", bind_addr);

    let listener = TcpListener::bind(bind_addr)
        .await
        .context("Failed to bind to address")?;

    tracing::info!("Relay listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Relay server shut down gracefully");
    Ok(())
}

/// Wait for Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
