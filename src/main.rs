// Admin Relay - authenticated CORS relay for a backend API
//
// This tool sits between a fixed browser origin and a backend API that
// requires a privileged service credential. Each inbound request names its
// real target in a `path` query parameter; the relay rewrites the request,
// injects the credential, forwards it, and returns the backend's response
// with permissive CORS headers so the browser can read it.
//
// Architecture:
// - Relay server (axum): accepts requests and answers CORS preflight
// - Forwarder (reqwest): rewrites headers and relays to the backend
// - Config: env vars over an optional TOML file, immutable after startup

mod cli;
mod config;
mod proxy;

use anyhow::Result;
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI subcommands (config inspection) before anything else
    if cli::handle_cli() {
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "admin_relay=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Fails fast when the backend origin or credential is absent; the
    // process never starts half-configured
    let config = Config::from_env()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        backend_origin = %config.backend_origin,
        upstream_timeout_secs = config.upstream_timeout_secs,
        "Configuration loaded"
    );

    proxy::start_relay(config).await
}
