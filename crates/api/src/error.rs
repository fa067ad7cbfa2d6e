//! Structured error response body (spec §6): `{success: false, error: CODE,
//! message}` with a closed set of machine-readable codes.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use labelforge_core::{ErrorKind, LabelError};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    DatabaseError,
    QueueError,
    ConfigurationError,
    GenerationNotFound,
    InternalError,
}

#[derive(Debug)]
pub struct ApiError {
    pub code: ErrorCode,
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::GenerationNotFound,
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationError,
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn queue(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::QueueError,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<LabelError> for ApiError {
    fn from(err: LabelError) -> Self {
        let code = match err.kind() {
            ErrorKind::Validation => ErrorCode::ValidationError,
            ErrorKind::Database => ErrorCode::DatabaseError,
            ErrorKind::Network | ErrorKind::Storage | ErrorKind::Processing => ErrorCode::InternalError,
        };
        let status = match code {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            code,
            status,
            message: err.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: ErrorCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorBody {
            success: false,
            error: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
