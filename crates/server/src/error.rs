//! Unified error handling for the HTTP surface.
//!
//! Every handler returns `Result<T, AppError>`; service and repository
//! errors convert into the response kinds below.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{MemberError, OrderError, ProductError};

/// Application-level error type for the backend.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(RepositoryError),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing or unresolvable credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Credentials are valid but do not grant this request.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Malformed request payload.
    #[error("validation error: {0}")]
    Validation(String),

    /// Conflicting state (e.g. duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Database(_)) {
            tracing::error!(error = %self, "request error");
        }

        let status = match &self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
        };

        // Don't leak storage details to clients.
        let message = match &self {
            Self::Database(_) => "internal server error".to_owned(),
            _ => self.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound("resource not found".to_owned()),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::InvalidApiKey => Self::Unauthorized(e.to_string()),
            OrderError::EmailMismatch => Self::Forbidden(e.to_string()),
            OrderError::ProductNotFound(_) => Self::NotFound(e.to_string()),
            OrderError::Repository(inner) => inner.into(),
        }
    }
}

impl From<MemberError> for AppError {
    fn from(e: MemberError) -> Self {
        match e {
            MemberError::EmailTaken => Self::Conflict(e.to_string()),
            MemberError::InvalidCredentials | MemberError::InvalidApiKey => {
                Self::Unauthorized(e.to_string())
            }
            MemberError::Repository(inner) => inner.into(),
        }
    }
}

impl From<ProductError> for AppError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::NotFound(_) => Self::NotFound(e.to_string()),
            ProductError::NameTaken => Self::Conflict(e.to_string()),
            ProductError::Repository(inner) => inner.into(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
