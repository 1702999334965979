//! Request middleware: API key check and per-client rate limiting

pub mod auth;
pub mod rate_limit;

pub use auth::{require_api_key, ApiKey};
pub use rate_limit::{enforce_rate_limit, FixedWindowLimiter};
