//! Static API key check
//!
//! Callers pass the key as the `API_KEY` query parameter or the
//! `accesstoken` header.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, Result};

pub const API_KEY_QUERY_PARAM: &str = "API_KEY";
pub const API_KEY_HEADER: &str = "accesstoken";

/// Expected API key
#[derive(Clone)]
pub struct ApiKey(Arc<str>);

impl ApiKey {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    fn matches(&self, candidate: Option<&str>) -> bool {
        candidate == Some(&*self.0)
    }
}

/// Reject requests that do not present the configured key
pub async fn require_api_key(
    State(expected): State<ApiKey>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response> {
    let presented = params
        .get(API_KEY_QUERY_PARAM)
        .map(String::as_str)
        .or_else(|| headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()));

    if !expected.matches(presented) {
        tracing::debug!(path = %request.uri().path(), "Rejected request with invalid API key");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
