use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use shipyard_cloud::CloudError;
use shipyard_core::error::CoreError;

use crate::dispatch::DispatchError;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce `{ "error", "code" }` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Dispatch(DispatchError::Invalid(CoreError::Validation(msg))) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }

            AppError::Dispatch(DispatchError::Launch(cloud)) => match cloud {
                CloudError::LaunchRejected(msg) => {
                    (StatusCode::BAD_GATEWAY, "LAUNCH_FAILED", msg.clone())
                }
                other => internal(other),
            },
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Log the detail and return a sanitized 500.
fn internal(detail: &dyn std::fmt::Display) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %detail, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
