//! Uniform response envelope shared by every endpoint

use axum::Json;
use serde::{Deserialize, Serialize};

/// Code reported for successful requests
pub const SUCCESS: &str = "SUCCESS";

/// Response wrapper: `{code, message, response, errors}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: String,
    pub message: String,
    pub response: Option<T>,
    pub errors: Vec<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `data`
    pub fn success(data: T) -> Self {
        Self::with_message("Success", Some(data))
    }

    /// Successful envelope with a custom message
    pub fn with_message(message: impl Into<String>, response: Option<T>) -> Self {
        Self {
            code: SUCCESS.to_string(),
            message: message.into(),
            response,
            errors: Vec::new(),
        }
    }
}

/// Wrap a service result for a handler return
pub fn success<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope::success(data))
}

/// `{count}` payload for the counting endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountResponse {
    pub count: u64,
}

/// `{word}` payload for the longest-word endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordResponse {
    pub word: String,
}
