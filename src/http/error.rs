use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::call::CallError;

/// HTTP-facing error, mapped from domain failures
///
/// Internal detail is logged, never sent to the client.
#[derive(Debug)]
pub enum ApiError {
    /// No caller identity header
    MissingIdentity,
    /// Caller is not the session owner
    Forbidden,
    NotFound(String),
    /// Operation not allowed in the session's current status
    Conflict(String),
    /// Malformed or rejected payload
    Unprocessable(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingIdentity => (
                StatusCode::UNAUTHORIZED,
                "missing x-user-id header".to_string(),
            ),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "not enough permissions".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Internal(msg) => {
                tracing::error!("internal server error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl From<CallError> for ApiError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::NotFound => ApiError::NotFound(err.to_string()),
            CallError::InvalidTransition { .. } => ApiError::Conflict(err.to_string()),
            CallError::Validation(msg) => ApiError::Unprocessable(msg),
        }
    }
}
