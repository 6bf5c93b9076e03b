//! Custom error types and handling
//!
//! This module defines the application's error types and implements
//! conversion to HTTP responses for the Axum framework.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Validation errors
    #[error("Test ID is required")]
    MissingTestId,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    // Resource errors
    #[error("Test not found: {0}")]
    TestNotFound(Uuid),

    #[error("Question {0} is not part of this test")]
    QuestionNotFound(Uuid),

    // Attempt state errors
    #[error("Invalid attempt: {0}")]
    InvalidAttempt(InvalidAttemptReason),

    #[error("Time has expired for this attempt")]
    TimeExpired,

    // Storage errors
    #[error("Failed to create attempt: {0}")]
    AttemptCreationFailed(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Store operation timed out after {0}ms")]
    StoreTimeout(u64),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Why an attempt was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidAttemptReason {
    NotFound,
    NotOwned,
    NotActive,
}

impl std::fmt::Display for InvalidAttemptReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "attempt not found"),
            Self::NotOwned => write!(f, "attempt belongs to another user"),
            Self::NotActive => write!(f, "attempt is no longer active"),
        }
    }
}

/// Coarse error classification used for propagation decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    NotFound,
    InvalidState,
    Validation,
    Internal,
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_code: String,
    pub message: String,
}

impl AppError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::MissingTestId => "MISSING_TEST_ID",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::RateLimited(_) => "RATE_LIMITED",
            Self::TestNotFound(_) => "TEST_NOT_FOUND",
            Self::QuestionNotFound(_) => "QUESTION_NOT_FOUND",
            Self::InvalidAttempt(_) => "INVALID_ATTEMPT",
            Self::TimeExpired => "TIME_EXPIRED",
            Self::AttemptCreationFailed(_) => "ATTEMPT_CREATION_FAILED",
            Self::Database(_) | Self::StoreTimeout(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::MissingTestId | Self::Validation(_) | Self::QuestionNotFound(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::TestNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidAttempt(InvalidAttemptReason::NotFound) => StatusCode::NOT_FOUND,
            Self::InvalidAttempt(_) | Self::TimeExpired => StatusCode::FORBIDDEN,
            Self::AttemptCreationFailed(_)
            | Self::Database(_)
            | Self::StoreTimeout(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) | Self::Forbidden(_) => ErrorKind::Auth,
            Self::MissingTestId | Self::Validation(_) | Self::RateLimited(_) => {
                ErrorKind::Validation
            }
            Self::TestNotFound(_)
            | Self::QuestionNotFound(_)
            | Self::InvalidAttempt(InvalidAttemptReason::NotFound) => ErrorKind::NotFound,
            Self::InvalidAttempt(_) | Self::TimeExpired => ErrorKind::InvalidState,
            Self::AttemptCreationFailed(_)
            | Self::Database(_)
            | Self::StoreTimeout(_)
            | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller may safely repeat the request
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log internal errors but don't expose details to clients
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                "An internal error occurred".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "A database error occurred".to_string()
            }
            AppError::AttemptCreationFailed(e) => {
                tracing::error!("Attempt creation failed: {}", e);
                "Failed to create attempt".to_string()
            }
            AppError::StoreTimeout(ms) => {
                tracing::error!(timeout_ms = ms, "Store operation timed out");
                "The request could not be completed in time".to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            success: false,
            error_code: self.error_code().to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

// Implement From for common error types
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::Unauthorized("Token expired".to_string())
            }
            _ => AppError::Unauthorized("Invalid token".to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::Validation(err.body_text())
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
