//! Shared state for the relay server

use std::sync::Arc;

use crate::config::Config;

/// State injected into the relay handler.
///
/// Cloned per request by axum; the reqwest client is internally
/// reference-counted, and the config is immutable after startup.
#[derive(Clone)]
pub(crate) struct RelayState {
    /// HTTP client for forwarding requests
    pub(crate) client: reqwest::Client,
    /// Startup configuration (backend origin, service credential)
    pub(crate) config: Arc<Config>,
}
