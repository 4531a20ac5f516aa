use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Why a request could not be proxied.
///
/// Upstream HTTP errors (404 and friends) are not errors here; they are
/// passed through to the client untouched.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Request has no Host")]
    MissingHost,

    /// The leftmost host label is not a valid job id.
    #[error("Host {0:?} does not name a deployment")]
    InvalidHost(String),

    /// The path would leave the deployment's artifact prefix.
    #[error("Path {0:?} is not allowed")]
    InvalidPath(String),

    #[error("Could not read request body: {0}")]
    RequestBody(String),

    /// The artifact store could not be reached.
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ProxyError::MissingHost => (StatusCode::BAD_REQUEST, "MISSING_HOST"),
            ProxyError::InvalidHost(_) => (StatusCode::BAD_REQUEST, "INVALID_HOST"),
            ProxyError::InvalidPath(_) => (StatusCode::BAD_REQUEST, "INVALID_PATH"),
            ProxyError::RequestBody(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ProxyError::Upstream(e) => {
                tracing::warn!(error = %e, "Upstream request failed");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE")
            }
            ProxyError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal proxy error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let message = match &self {
            ProxyError::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
