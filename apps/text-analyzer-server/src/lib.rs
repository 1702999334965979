//! Text Analyzer Server Library
//!
//! Stores text documents together with lexical metrics computed at creation
//! and serves those metrics over a JSON API. The server binary is in main.rs.
//!
//! # Modules
//!
//! - `analysis`: metric computation, analyzer service and its read cache
//! - `db`: SQLite-backed document store and typed repositories
//! - `routes`: axum routers and handlers
//! - `middleware`: API key check and fixed-window rate limiting

pub mod analysis;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
pub mod text;
pub mod validation;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
