//! Relay module - HTTP server that forwards requests to the backend API
//!
//! This module implements an authenticated relay using Axum. Each inbound
//! request names its real target in a `path` query parameter; the relay
//! rewrites the request to that target, swaps in the configured service
//! credential, forwards it with reqwest, and returns the backend's response
//! with permissive CORS headers attached so a fixed browser origin can call
//! the backend without holding the credential itself.

pub mod server;

mod error;
mod headers;
mod state;

use std::collections::HashMap;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header::CONTENT_TYPE, Method, Request, Response, Uri},
    response::IntoResponse,
};

pub use server::start_relay;

use error::RelayError;
use state::RelayState;

/// Main relay handler - accepts any method on any path.
///
/// `OPTIONS` is answered locally so cross-origin preflight succeeds without
/// touching the backend. Everything else is forwarded; failures map to the
/// two-bucket error model in [`error`].
async fn relay_handler(State(state): State<RelayState>, req: Request<Body>) -> Response<Body> {
    if req.method() == Method::OPTIONS {
        return preflight_response();
    }

    match forward(&state, req).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Response for cross-origin preflight: 200, body "ok", CORS headers only.
fn preflight_response() -> Response<Body> {
    let mut response = Response::new(Body::from("ok"));
    response.headers_mut().extend(headers::cors_headers());
    response
}

/// Forward one request to its target and relay the response.
async fn forward(state: &RelayState, req: Request<Body>) -> Result<Response<Body>, RelayError> {
    let method = req.method().clone();

    let path = query_path(req.uri()).ok_or(RelayError::MissingPath)?;
    let target = headers::resolve_target(&state.config.backend_origin, &path);

    let forwarded_headers =
        headers::build_forward_headers(req.headers(), &state.config.service_credential)?;

    tracing::debug!("Relaying {} {} -> {}", method, req.uri(), target);

    // Read-only methods never carry a body upstream, even if the caller sent one
    let body = if method == Method::GET || method == Method::HEAD {
        None
    } else {
        let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
            .await
            .map_err(|e| RelayError::Upstream(e.to_string()))?;
        Some(bytes)
    };

    let mut outbound = state
        .client
        .request(method, &target)
        .headers(forwarded_headers);
    if let Some(bytes) = body {
        outbound = outbound.body(bytes);
    }

    let response = outbound
        .send()
        .await
        .map_err(|e| RelayError::Upstream(e.to_string()))?;

    let status = response.status();
    let content_type = response.headers().get(CONTENT_TYPE).cloned();
    let response_body = response
        .bytes()
        .await
        .map_err(|e| RelayError::Upstream(e.to_string()))?;

    // The relayed response starts from the fixed CORS set; the only backend
    // header that survives is Content-Type
    let mut relayed = Response::new(Body::from(response_body));
    *relayed.status_mut() = status;
    relayed.headers_mut().extend(headers::cors_headers());
    if let Some(content_type) = content_type {
        relayed.headers_mut().insert(CONTENT_TYPE, content_type);
    }

    Ok(relayed)
}

/// Extract the `path` query parameter. An empty value counts as missing.
fn query_path(uri: &Uri) -> Option<String> {
    let Query(mut params) = Query::<HashMap<String, String>>::try_from_uri(uri).ok()?;
    params.remove("path").filter(|p| !p.is_empty())
}
