//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::coordinator::ScheduleError;
use crate::db::repository::RepositoryError;
use crate::rules::Conflict;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Full conflict list for rejected assignments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<Conflict>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            conflicts: Vec::new(),
        }
    }

    pub fn with_conflicts(mut self, conflicts: Vec<Conflict>) -> Self {
        self.conflicts = conflicts;
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (format or validation error)
    BadRequest(String),
    /// Rejected assignment; carries the full conflict list so a client can
    /// enumerate every reason
    Conflict(Vec<Conflict>),
    /// Headcount or hour cap exceeded
    Capacity(String),
    /// Missing or invalid session token
    Unauthorized(String),
    /// Valid session, insufficient role
    Forbidden,
    /// Internal server error
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Conflict(conflicts) => (
                StatusCode::CONFLICT,
                ApiError::new("CONFLICT", "Scheduling conflicts detected")
                    .with_conflicts(conflicts),
            ),
            AppError::Capacity(msg) => (StatusCode::BAD_REQUEST, ApiError::new("CAPACITY", msg)),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ApiError::new("UNAUTHORIZED", msg))
            }
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                ApiError::new("FORBIDDEN", "Manager or admin role required"),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
        };

        (status, Json(error)).into_response()
    }
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::TimeFormat(e) => AppError::BadRequest(e.to_string()),
            ScheduleError::DateFormat { .. } | ScheduleError::ZeroLengthShift { .. } => {
                AppError::BadRequest(err.to_string())
            }
            ScheduleError::Conflict { conflicts } => AppError::Conflict(conflicts),
            ScheduleError::Capacity(msg) => AppError::Capacity(msg),
            ScheduleError::UnknownRole { .. } => AppError::BadRequest(err.to_string()),
            ScheduleError::NotFound { .. } => AppError::NotFound(err.to_string()),
            ScheduleError::Repository(e) => e.into(),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match &err {
            RepositoryError::NotFound { .. } => AppError::NotFound(err.to_string()),
            RepositoryError::Validation { .. } | RepositoryError::Duplicate { .. } => {
                AppError::BadRequest(err.to_string())
            }
            RepositoryError::Configuration { .. } | RepositoryError::Internal { .. } => {
                AppError::Internal(err.to_string())
            }
        }
    }
}
