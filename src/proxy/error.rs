//! Relay error types and response handling

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderValue, Response, StatusCode},
    response::IntoResponse,
};
use serde_json::json;

use super::headers::cors_headers;

/// Errors that can occur while relaying a request.
///
/// Deliberately coarse: the caller either sent an unusable request
/// (`MissingPath`, 400) or something failed between here and the backend
/// (`Upstream`, 500). No other buckets exist.
#[derive(Debug)]
pub(crate) enum RelayError {
    /// The required `path` query parameter was absent
    MissingPath,
    /// Anything that failed while building, sending, or reading the forward
    Upstream(String),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response<Body> {
        let (status, message) = match self {
            RelayError::MissingPath => (
                StatusCode::BAD_REQUEST,
                "Missing path query parameter".to_string(),
            ),
            RelayError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        tracing::error!("Relay error: {} - {}", status, message);

        let mut response = Response::new(Body::from(json!({ "error": message }).to_string()));
        *response.status_mut() = status;

        // CORS headers go on error responses too, otherwise the browser
        // reports an opaque CORS failure instead of the error body
        response.headers_mut().extend(cors_headers());
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_path_maps_to_400_json() {
        let response = RelayError::MissingPath.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_some());

        let json = body_json(response).await;
        assert_eq!(json["error"], "Missing path query parameter");
    }

    #[tokio::test]
    async fn test_upstream_maps_to_500_json_with_cors() {
        let response = RelayError::Upstream("connection refused".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_some());

        let json = body_json(response).await;
        assert_eq!(json["error"], "connection refused");
    }
}
