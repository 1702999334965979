//! Text Analyzer Server
//!
//! Computes word, character, sentence and paragraph statistics for submitted
//! text and serves them from a cached SQLite document store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::Notify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use text_analyzer_server::{db, routes, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "text_analyzer_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Starting Text Analyzer Server v{}", env!("CARGO_PKG_VERSION"));
    if config.auth.api_key.is_none() {
        tracing::warn!("API_KEY is not set, API routes are unauthenticated");
    }

    let db_pool = db::create_pool(&config.database)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database initialized at {}", config.database.url);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let shutdown_timeout = config.server.shutdown_timeout;

    let app_state = AppState::new(config, db_pool);
    let app = routes::app(app_state.clone());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Text Analyzer Server listening on {}", listener.local_addr()?);

    // Fires once a shutdown signal arrives, so the drain can be timed
    let signalled = Arc::new(Notify::new());
    let notify = Arc::clone(&signalled);

    let mut server = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            notify.notify_one();
        })
        .await
    });

    tokio::select! {
        result = &mut server => result??,
        _ = signalled.notified() => {
            match tokio::time::timeout(shutdown_timeout, &mut server).await {
                Ok(result) => result??,
                Err(_) => {
                    tracing::warn!(
                        timeout_secs = shutdown_timeout.as_secs(),
                        "Connections still open after shutdown timeout, forcing exit"
                    );
                    server.abort();
                }
            }
        }
    }

    app_state.shutdown().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
