//! Header and target-URL processing for forwarded requests
//!
//! The relay rewrites the inbound header set before forwarding: transport
//! headers that the client connection owns are dropped, and the service
//! credential replaces whatever credentials the caller sent. Every response
//! we produce carries the fixed CORS header set so the browser origin can
//! read it, including error responses.

use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, AUTHORIZATION, CONNECTION,
    CONTENT_LENGTH, HOST, TRANSFER_ENCODING,
};

use super::error::RelayError;

/// Browser origin allowed to read relayed responses
const ALLOW_ORIGIN: &str = "https://m3dkzn.github.io";

/// Request headers the browser may send cross-origin
const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Methods the browser may use cross-origin
const ALLOW_METHODS: &str = "GET,POST,PATCH,DELETE,OPTIONS";

/// Credential header expected by the backend alongside the bearer token
pub(crate) const APIKEY: &str = "apikey";

/// The fixed CORS header set attached to every response
pub(crate) fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(3);
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ALLOW_ORIGIN));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers
}

/// Headers never copied from the inbound request.
///
/// `content-length` must go because the body size may change in transit;
/// the rest belong to the inbound hop, not the outbound one. Matching is
/// case-insensitive by construction: `HeaderName` is lowercase-normalized.
const SKIP_HEADERS: [HeaderName; 4] = [CONTENT_LENGTH, HOST, CONNECTION, TRANSFER_ENCODING];

/// Build the header set for the outbound request.
///
/// Copies all inbound headers except the skip list, then sets `apikey` and
/// `Authorization: Bearer <credential>` to the configured service
/// credential. Inbound values for those two keys are overwritten, never
/// merged: the caller's own credentials must not reach the backend.
pub(crate) fn build_forward_headers(
    inbound: &HeaderMap,
    credential: &str,
) -> Result<HeaderMap, RelayError> {
    let mut forwarded = HeaderMap::with_capacity(inbound.len() + 2);

    for (key, value) in inbound {
        if SKIP_HEADERS.contains(key) {
            continue;
        }
        forwarded.append(key.clone(), value.clone());
    }

    let apikey = HeaderValue::from_str(credential)
        .map_err(|e| RelayError::Upstream(format!("Invalid service credential: {e}")))?;
    let bearer = HeaderValue::from_str(&format!("Bearer {credential}"))
        .map_err(|e| RelayError::Upstream(format!("Invalid service credential: {e}")))?;

    // insert (not append) replaces any inbound values for these keys
    forwarded.insert(APIKEY, apikey);
    forwarded.insert(AUTHORIZATION, bearer);

    Ok(forwarded)
}

/// Compute the outbound target URL.
///
/// A `path` that already carries an HTTP scheme is used unchanged; anything
/// else is concatenated onto the configured backend origin verbatim, with no
/// normalization.
pub(crate) fn resolve_target(backend_origin: &str, path: &str) -> String {
    if path.starts_with("http") {
        path.to_string()
    } else {
        format!("{backend_origin}{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_headers_fixed_values() {
        let headers = cors_headers();

        assert_eq!(
            headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://m3dkzn.github.io"
        );
        assert_eq!(
            headers.get(ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
            "authorization, x-client-info, apikey, content-type"
        );
        assert_eq!(
            headers.get(ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "GET,POST,PATCH,DELETE,OPTIONS"
        );
    }

    #[test]
    fn test_content_length_never_forwarded() {
        let mut inbound = HeaderMap::new();
        // Mixed-case on the wire; HeaderName normalizes to lowercase
        inbound.insert(
            "Content-Length".parse::<HeaderName>().unwrap(),
            HeaderValue::from_static("42"),
        );
        inbound.insert("x-client-info", HeaderValue::from_static("test-client"));

        let forwarded = build_forward_headers(&inbound, "key").unwrap();

        assert!(forwarded.get(CONTENT_LENGTH).is_none());
        assert_eq!(forwarded.get("x-client-info").unwrap(), "test-client");
    }

    #[test]
    fn test_hop_headers_dropped() {
        let mut inbound = HeaderMap::new();
        inbound.insert(HOST, HeaderValue::from_static("relay.local"));
        inbound.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        inbound.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        inbound.insert("accept", HeaderValue::from_static("application/json"));

        let forwarded = build_forward_headers(&inbound, "key").unwrap();

        assert!(forwarded.get(HOST).is_none());
        assert!(forwarded.get(CONNECTION).is_none());
        assert!(forwarded.get(TRANSFER_ENCODING).is_none());
        assert_eq!(forwarded.get("accept").unwrap(), "application/json");
    }

    #[test]
    fn test_credential_overwrites_inbound_values() {
        let mut inbound = HeaderMap::new();
        inbound.insert(AUTHORIZATION, HeaderValue::from_static("Bearer caller-token"));
        inbound.insert(APIKEY, HeaderValue::from_static("caller-key"));

        let forwarded = build_forward_headers(&inbound, "service-key").unwrap();

        assert_eq!(forwarded.get(APIKEY).unwrap(), "service-key");
        assert_eq!(forwarded.get(AUTHORIZATION).unwrap(), "Bearer service-key");
        // Overwritten, not merged: exactly one value per credential key
        assert_eq!(forwarded.get_all(AUTHORIZATION).iter().count(), 1);
        assert_eq!(forwarded.get_all(APIKEY).iter().count(), 1);
    }

    #[test]
    fn test_credential_set_even_when_absent_inbound() {
        let forwarded = build_forward_headers(&HeaderMap::new(), "service-key").unwrap();

        assert_eq!(forwarded.get(APIKEY).unwrap(), "service-key");
        assert_eq!(forwarded.get(AUTHORIZATION).unwrap(), "Bearer service-key");
    }

    #[test]
    fn test_non_ascii_credential_rejected() {
        assert!(build_forward_headers(&HeaderMap::new(), "clé\n").is_err());
    }

    #[test]
    fn test_resolve_target_absolute_passthrough() {
        assert_eq!(
            resolve_target("https://api.example.com", "https://other.example.org/v1/items"),
            "https://other.example.org/v1/items"
        );
        assert_eq!(
            resolve_target("https://api.example.com", "http://insecure.example.org/x"),
            "http://insecure.example.org/x"
        );
    }

    #[test]
    fn test_resolve_target_relative_concatenation() {
        assert_eq!(
            resolve_target("https://api.example.com", "/rest/v1/items"),
            "https://api.example.com/rest/v1/items"
        );
    }
}
