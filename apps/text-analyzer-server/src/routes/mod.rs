//! Route modules for Text Analyzer Server

pub mod analyzer;
pub mod health;
pub mod text;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::{Map, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{AppError, Result};
use crate::middleware::{require_api_key, ApiKey};
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let mut v1 = Router::new()
        .nest("/analyzer", analyzer::router(&state))
        .nest("/text", text::router(&state));

    if let Some(key) = &state.config().auth.api_key {
        v1 = v1.route_layer(middleware::from_fn_with_state(
            ApiKey::new(key.as_str()),
            require_api_key,
        ));
    }

    // Health stays reachable without an API key
    let v1 = v1.route("/health", get(health::health_check));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", v1)
        .fallback(not_found)
        .layer(middleware::from_fn(method_not_allowed))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn not_found(method: Method, uri: Uri) -> AppError {
    tracing::debug!(%method, path = %uri.path(), "No route matched");
    AppError::RouteNotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}

/// Report a known path hit with the wrong method like any unmatched route
async fn method_not_allowed(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    tracing::debug!(%method, %path, "Method not allowed");
    AppError::RouteNotFound {
        method: method.to_string(),
        path,
    }
    .into_response()
}

/// JSON request body as a loose value
///
/// A body sent without a JSON content type, or with no bytes at all, reads
/// as `{}`. Malformed JSON is a single validation message.
pub(crate) struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self> {
        let is_json = has_json_content_type(request.headers());
        let bytes = Bytes::from_request(request, state)
            .await
            .map_err(|rejection| AppError::Validation(vec![rejection.body_text()]))?;

        if !is_json || bytes.is_empty() {
            return Ok(JsonBody(Value::Object(Map::new())));
        }

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| AppError::Validation(vec![format!("Invalid JSON body: {}", e)]))
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::state::AppState;

    pub async fn test_app(config: Config) -> Router {
        let pool = crate::db::memory_pool().await;
        super::app(AppState::new(config, pool))
    }

    /// Default config without rate limiting
    pub fn unlimited_config() -> Config {
        let mut config = Config::default();
        config.rate_limit.enabled = false;
        config
    }

    pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}
