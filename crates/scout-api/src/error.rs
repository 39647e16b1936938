//! API error types and HTTP response mapping.
//!
//! Errors are caught exactly once, at the handler boundary. Validation
//! messages are returned verbatim; configuration and dispatch failures get
//! generic messages so infrastructure detail never leaks to callers, with
//! the underlying cause logged server-side.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use scout_core::Error as CoreError;

/// API result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Standard JSON error envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorBody {
    /// Always `false` for error responses.
    pub success: bool,
    /// Human-readable message (safe for clients).
    pub error: String,
    /// Stable machine-readable error code.
    pub code: String,
}

/// HTTP API error with a stable machine-readable code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Returns an error response for invalid input.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    /// Returns an error response for upstream dispatch failures.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "WORKFLOW_START_FAILED", message)
    }

    /// Returns an internal error response.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", message)
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the human-readable error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiErrorBody {
                success: false,
                error: self.message,
                code: self.code.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::Validation(message) => {
                tracing::warn!(error = %message, "request validation failed");
                Self::bad_request(message)
            }
            CoreError::Configuration(message) => {
                tracing::error!(error = %message, "configuration error");
                Self::internal("Internal configuration error")
            }
            CoreError::WorkflowStart(message) => {
                tracing::error!(error = %message, "workflow dispatch failed");
                Self::bad_gateway("Failed to start search workflow")
            }
            CoreError::Internal(message) => {
                tracing::error!(error = %message, "internal error");
                Self::internal("Internal server error")
            }
        }
    }
}
