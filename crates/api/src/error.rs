//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use orchestrator::OrchestrationError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client (malformed header, unknown status
    /// string).
    BadRequest(String),
    /// Failure surfaced by the orchestrator.
    Orchestration(OrchestrationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Orchestration(err) => orchestration_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn orchestration_error_to_response(err: OrchestrationError) -> (StatusCode, String) {
    match &err {
        OrchestrationError::ResourceNotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        OrchestrationError::InvalidOrder(_) | OrchestrationError::InvalidTransition { .. } => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        OrchestrationError::InsufficientStock { .. } => (StatusCode::CONFLICT, err.to_string()),
        OrchestrationError::PaymentFailed { .. } => {
            (StatusCode::PAYMENT_REQUIRED, err.to_string())
        }
        OrchestrationError::ServiceCommunication(_) => (StatusCode::BAD_GATEWAY, err.to_string()),
        OrchestrationError::Store(_) => {
            tracing::error!(error = %err, "store failure");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<OrchestrationError> for ApiError {
    fn from(err: OrchestrationError) -> Self {
        ApiError::Orchestration(err)
    }
}
