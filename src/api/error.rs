//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core_state::CoreError;
use crate::db::DatabaseError;
use crate::models::{Stage, StageStatus};
use crate::storage::StorageError;
use crate::verification::VerificationError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Admin access is not configured")]
    AdminDisabled,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("{0}")]
    Precondition(String),
    #[error("{0}")]
    FormatInvalid(String),
    #[error("{message}")]
    PolicyRejected {
        message: String,
        stage: Stage,
        status: StageStatus,
        reasons: Vec<String>,
    },
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut details = None;
        let (status, code, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::AdminDisabled => (
                StatusCode::SERVICE_UNAVAILABLE,
                "ADMIN_DISABLED",
                "Admin access is not configured on this server".to_string(),
            ),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail),
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::Precondition(detail) => {
                (StatusCode::BAD_REQUEST, "PRECONDITION_VIOLATION", detail)
            }
            ApiError::FormatInvalid(detail) => (StatusCode::BAD_REQUEST, "FORMAT_INVALID", detail),
            ApiError::PolicyRejected {
                message,
                stage,
                status,
                reasons,
            } => {
                details = Some(serde_json::json!({
                    "stage": stage,
                    "status": status,
                    "reasons": reasons,
                }));
                (StatusCode::UNPROCESSABLE_ENTITY, "POLICY_REJECTED", message)
            }
            ApiError::PayloadTooLarge(detail) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", detail)
            }
            ApiError::UnsupportedMedia(detail) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                detail,
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SessionNotFound(id) => {
                ApiError::NotFound(format!("Verification session {id} not found"))
            }
            CoreError::LockPoisoned => ApiError::Internal("lock poisoned".into()),
            CoreError::Database(e) => e.into(),
            CoreError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{entity_type} '{id}' not found"))
            }
            DatabaseError::ConstraintViolation(detail) => ApiError::Conflict(detail),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<VerificationError> for ApiError {
    fn from(err: VerificationError) -> Self {
        let message = err.to_string();
        match err {
            VerificationError::PreconditionViolation { .. } => ApiError::Precondition(message),
            VerificationError::FormatInvalid { .. } => ApiError::FormatInvalid(message),
            VerificationError::PolicyRejected {
                stage,
                status,
                reasons,
            } => ApiError::PolicyRejected {
                message,
                stage,
                status,
                reasons,
            },
            VerificationError::Database(e) => e.into(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnsupportedType { .. } | StorageError::ContentMismatch { .. } => {
                ApiError::UnsupportedMedia(err.to_string())
            }
            StorageError::FileTooLarge { .. } => ApiError::PayloadTooLarge(err.to_string()),
            StorageError::Empty => ApiError::BadRequest(err.to_string()),
            StorageError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}
