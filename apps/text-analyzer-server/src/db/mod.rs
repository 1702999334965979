//! Database module for SQLite persistence
//!
//! Documents of every collection are stored as JSON bodies behind the
//! [`DocumentStore`] trait; typed access goes through [`Repository`].

mod analyzer;
mod repository;
mod schema;
mod store;
mod text;

pub use analyzer::*;
pub use repository::*;
pub use schema::*;
pub use store::*;
pub use text::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::DatabaseConfig;
use crate::error::Result;

/// Create a new database connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

    // Each in-memory connection is its own database, so keep exactly one alive
    let pool = if config.url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await?
    };

    // Run migrations
    initialize_schema(&pool).await?;

    Ok(pool)
}

/// In-memory pool for tests
#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    create_pool(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    })
    .await
    .unwrap()
}
