//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps registry rejections and identifier validation failures to HTTP
//! status codes with a JSON body carrying a machine-readable code.
//! Internal error details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use diploma_core::ValidationError;
use diploma_state::RegistryError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_ELIGIBLE", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for some client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be read as JSON (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid bearer credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The registry rejected the operation. Status depends on the rejection.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Registry(err) => (registry_status(err), err.code()),
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self, Self::Registry(RegistryError::IndexCorrupted { .. }))
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Registry(RegistryError::WrongAmount { expected, attached }) => Some(
                serde_json::json!({ "expected": expected.units(), "attached": attached.units() }),
            ),
            _ => None,
        }
    }
}

fn registry_status(err: &RegistryError) -> StatusCode {
    match err {
        RegistryError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        RegistryError::NotFound { .. } => StatusCode::NOT_FOUND,
        RegistryError::AlreadyRegistered { .. } | RegistryError::AlreadyPaid { .. } => {
            StatusCode::CONFLICT
        }
        RegistryError::NotEligible { .. } | RegistryError::WrongAmount { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RegistryError::TransferFailed { .. } => StatusCode::BAD_GATEWAY,
        RegistryError::IndexCorrupted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if self.is_internal() {
            tracing::error!(error = %self, "internal server error");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
