//! Error types for the Text Analyzer server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::response::Envelope;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// A referenced entity does not exist. Reported as a bad request.
    #[error("{0}")]
    NotFound(String),

    #[error("Invalid user/api token")]
    Unauthorized,

    #[error("Too many requests")]
    RateLimited,

    #[error("Cannot {method} {path}")]
    RouteNotFound { method: String, path: String },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error codes carried in the `code` field of the envelope
pub mod codes {
    pub const PAGE_NOT_FOUND: &str = "E_PAGE_NOT_FOUND";
    pub const UNAUTHORIZED: &str = "E_UNAUTHORIZED";
    pub const VALIDATION_FAILED: &str = "E_VALIDATION_FAILED";
    pub const TOO_MANY_REQUESTS: &str = "E_TOO_MANY_REQUESTS";
    pub const INTERNAL_SERVER_ERROR: &str = "E_INTERNAL_SERVER_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal Server Error";

impl AppError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::NotFound(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::InvalidIdentifier(_)
            | AppError::Internal(_)
            | AppError::Database(_)
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn envelope(&self) -> Envelope<()> {
        let (code, message, errors) = match self {
            AppError::Validation(messages) => (
                codes::VALIDATION_FAILED,
                "Please fill up required all fields and valid data".to_string(),
                messages.clone(),
            ),
            AppError::NotFound(msg) => (codes::BAD_REQUEST, msg.clone(), vec![msg.clone()]),
            AppError::Unauthorized => (
                codes::UNAUTHORIZED,
                self.to_string(),
                vec![self.to_string()],
            ),
            AppError::RateLimited => {
                let msg = "Too many requests, please try again later".to_string();
                (codes::TOO_MANY_REQUESTS, msg.clone(), vec![msg])
            }
            AppError::RouteNotFound { .. } => (
                codes::PAGE_NOT_FOUND,
                "please be sane and hit correct endpoints".to_string(),
                vec![self.to_string()],
            ),
            AppError::InvalidIdentifier(_)
            | AppError::Internal(_)
            | AppError::Database(_)
            | AppError::Serialization(_) => (
                codes::INTERNAL_SERVER_ERROR,
                INTERNAL_SERVER_ERROR_MESSAGE.to_string(),
                vec![INTERNAL_SERVER_ERROR_MESSAGE.to_string()],
            ),
        };

        Envelope {
            code: code.to_string(),
            message,
            response: None,
            errors,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Error caught by global handler: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }

        (status, Json(self.envelope())).into_response()
    }
}
