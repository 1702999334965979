//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::analysis::AnalyzerService;
use crate::config::Config;
use crate::db::{
    AnalyzerRepository, DocumentStore, SqliteDocumentStore, TextRepository, ANALYZERS_COLLECTION,
    TEXTS_COLLECTION,
};
use crate::middleware::FixedWindowLimiter;
use crate::text::TextService;

/// Separate limiters for write and read traffic
pub struct RateLimiters {
    pub create: FixedWindowLimiter,
    pub read: FixedWindowLimiter,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    db: SqlitePool,
    analyzer_service: AnalyzerService,
    text_service: TextService,
    rate_limiters: Option<RateLimiters>,
}

impl AppState {
    /// Wire services, cache and limiters on top of the database pool
    pub fn new(config: Config, db: SqlitePool) -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::new(db.clone()));

        let analyzer_service = AnalyzerService::new(
            AnalyzerRepository::new(Arc::clone(&store), ANALYZERS_COLLECTION),
            config.cache,
        );
        let text_service = TextService::new(TextRepository::new(store, TEXTS_COLLECTION));

        let rate_limiters = config.rate_limit.enabled.then(|| RateLimiters {
            create: FixedWindowLimiter::new(config.rate_limit.window, config.rate_limit.create_max),
            read: FixedWindowLimiter::new(config.rate_limit.window, config.rate_limit.read_max),
        });

        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                analyzer_service,
                text_service,
                rate_limiters,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    pub fn analyzer_service(&self) -> &AnalyzerService {
        &self.inner.analyzer_service
    }

    pub fn text_service(&self) -> &TextService {
        &self.inner.text_service
    }

    /// Rate limiters, when rate limiting is enabled
    pub fn rate_limiters(&self) -> Option<&RateLimiters> {
        self.inner.rate_limiters.as_ref()
    }

    /// Close the database pool
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down application state...");
        self.db().close().await;
    }
}
