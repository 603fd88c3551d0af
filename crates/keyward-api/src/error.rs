//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

use keyward_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Transport wrapper that turns an [`AppError`] into a response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::invalid_argument(rejection.body_text()))
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self(AppError::invalid_argument(errors.to_string()))
    }
}

impl ApiError {
    /// Status code and public message for this error.
    fn status_and_message(&self) -> (StatusCode, String) {
        let err = &self.0;
        match err.kind {
            ErrorKind::InvalidArgument => (StatusCode::BAD_REQUEST, err.message.clone()),
            ErrorKind::InvalidCredentials | ErrorKind::InvalidToken => {
                (StatusCode::UNAUTHORIZED, err.message.clone())
            }
            ErrorKind::EmailExists | ErrorKind::UsernameExists => {
                (StatusCode::CONFLICT, err.message.clone())
            }
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, err.message.clone()),
            ErrorKind::Cancelled => (
                StatusCode::SERVICE_UNAVAILABLE,
                "request was cancelled".to_string(),
            ),
            _ => {
                tracing::error!(kind = %err.kind, error = ?err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let error = match status {
            StatusCode::INTERNAL_SERVER_ERROR => ErrorKind::Internal.to_string(),
            _ => self.0.kind.to_string(),
        };

        (status, Json(ApiErrorResponse { error, message })).into_response()
    }
}
