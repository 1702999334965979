//! Health check endpoints

use axum::Json;

use crate::response::Envelope;

pub const WELCOME_MESSAGE: &str = "Welcome to Text Analyzer API";

pub async fn health_check() -> Json<Envelope<()>> {
    tracing::trace!(version = env!("CARGO_PKG_VERSION"), "Health check");
    Json(Envelope::with_message(WELCOME_MESSAGE, None))
}
