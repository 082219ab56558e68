//! HTTP error mapping.
//!
//! Domain errors carry enough information to pick a status code and a
//! stable machine-readable code; the body shape `{error, code}` is the
//! same for every failing endpoint. Internal failures are logged in full
//! and returned with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::domain::errors::DomainError;

/// JSON envelope returned by every failing endpoint.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

/// An HTTP-mapped error: response status plus the body fields.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status of the response
    pub status: StatusCode,
    /// Stable machine-readable code (`NOT_FOUND`, `VALIDATION_FAILED`, ...)
    pub code: &'static str,
    /// Human-readable message for the `error` field
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    /// 401 for missing or unresolvable credentials.
    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "invalid or missing session token",
        )
    }

    /// 400 for a malformed or missing request parameter.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::GoalNotFound(_) | DomainError::UnitNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
            }
            DomainError::Forbidden(_) => {
                Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", err.to_string())
            }
            DomainError::InvalidOperation(_) => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_OPERATION", err.to_string())
            }
            DomainError::ValidationFailed(_) => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", err.to_string())
            }
            DomainError::IntegrityViolation(_)
            | DomainError::DatabaseError(_)
            | DomainError::SerializationError(_) => {
                // Full detail stays server-side.
                tracing::error!(error = %err, "internal error while serving request");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.message, code: self.code };
        (self.status, Json(body)).into_response()
    }
}
