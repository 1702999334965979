//! Analyzer API routes

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::db::{Analyzer, CreateAnalyzer};
use crate::error::Result;
use crate::middleware::enforce_rate_limit;
use crate::response::{self, CountResponse, Envelope, WordResponse};
use crate::state::AppState;
use crate::validation::{Field, FieldKind, Schema};

use super::JsonBody;

const CREATE_SCHEMA: Schema = Schema::new(&[
    Field::required("content", FieldKind::String),
    Field::optional("createdBy", FieldKind::Integer),
]);

const LOOKUP_SCHEMA: Schema = Schema::new(&[Field::required("analyzerId", FieldKind::String)]);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzerQuery {
    analyzer_id: String,
}

/// Create the analyzer router
pub fn router(state: &AppState) -> Router<AppState> {
    let mut create = Router::new().route("/create", post(create_analyzer));
    let mut reads = Router::new()
        .route("/words-count", get(words_count))
        .route("/characters-count", get(characters_count))
        .route("/sentences-count", get(sentences_count))
        .route("/paragraphs-count", get(paragraphs_count))
        .route("/longest-word", get(longest_word));

    if let Some(limiters) = state.rate_limiters() {
        create = create.route_layer(middleware::from_fn_with_state(
            limiters.create.clone(),
            enforce_rate_limit,
        ));
        reads = reads.route_layer(middleware::from_fn_with_state(
            limiters.read.clone(),
            enforce_rate_limit,
        ));
    }

    create.merge(reads)
}

fn analyzer_id(params: HashMap<String, String>) -> Result<String> {
    let input = serde_json::to_value(params)?;
    let query: AnalyzerQuery = LOOKUP_SCHEMA.parse(&input)?;
    Ok(query.analyzer_id)
}

/// Analyze and store new content
async fn create_analyzer(
    State(state): State<AppState>,
    JsonBody(input): JsonBody,
) -> Result<Json<Envelope<Analyzer>>> {
    let data: CreateAnalyzer = CREATE_SCHEMA.parse(&input)?;

    let analyzer = state.analyzer_service().create(data).await?;
    Ok(response::success(analyzer))
}

async fn words_count(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<CountResponse>>> {
    let id = analyzer_id(params)?;
    let count = state.analyzer_service().get_words_count(&id).await?;
    Ok(response::success(CountResponse { count }))
}

async fn characters_count(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<CountResponse>>> {
    let id = analyzer_id(params)?;
    let count = state.analyzer_service().get_characters_count(&id).await?;
    Ok(response::success(CountResponse { count }))
}

async fn sentences_count(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<CountResponse>>> {
    let id = analyzer_id(params)?;
    let count = state.analyzer_service().get_sentences_count(&id).await?;
    Ok(response::success(CountResponse { count }))
}

async fn paragraphs_count(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<CountResponse>>> {
    let id = analyzer_id(params)?;
    let count = state.analyzer_service().get_paragraphs_count(&id).await?;
    Ok(response::success(CountResponse { count }))
}

async fn longest_word(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<WordResponse>>> {
    let id = analyzer_id(params)?;
    let word = state.analyzer_service().get_longest_word(&id).await?;
    Ok(response::success(WordResponse { word }))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::*;

    async fn create(app: &axum::Router, content: &str) -> String {
        let (status, body) = send(
            app,
            post_json("/api/v1/analyzer/create", json!({ "content": content })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["response"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_create_returns_entity() {
        let app = test_app(unlimited_config()).await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/analyzer/create",
                json!({ "content": "The quick brown fox jumps over the lazy dog.", "createdBy": 3 }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], "SUCCESS");
        assert_eq!(body["message"], "Success");
        assert_eq!(body["errors"], json!([]));

        let entity = &body["response"];
        assert!(entity["id"].is_string());
        assert_eq!(entity["content"], "The quick brown fox jumps over the lazy dog.");
        assert_eq!(entity["wordsCount"], 9);
        assert_eq!(entity["charactersCount"], 35);
        assert_eq!(entity["sentencesCount"], 1);
        assert_eq!(entity["paragraphsCount"], 1);
        assert_eq!(entity["longestWord"], "quick");
        assert_eq!(entity["createdBy"], 3);
        assert!(entity["createdAt"].is_string());
        assert!(entity["updatedAt"].is_string());
    }

    #[tokio::test]
    async fn test_metric_endpoints() {
        let app = test_app(unlimited_config()).await;
        let id = create(&app, "Paragraph one.\nParagraph two.\n\nParagraph three.").await;

        let cases = [
            ("words-count", json!({ "count": 6 })),
            ("characters-count", json!({ "count": 38 })),
            ("sentences-count", json!({ "count": 3 })),
            ("paragraphs-count", json!({ "count": 3 })),
            ("longest-word", json!({ "word": "paragraph" })),
        ];

        for (path, expected) in cases {
            let (status, body) = send(&app, get(&format!("/api/v1/analyzer/{path}?analyzerId={id}"))).await;
            assert_eq!(status, StatusCode::OK, "{path}");
            assert_eq!(body["response"], expected, "{path}");
        }
    }

    #[tokio::test]
    async fn test_create_validation() {
        let app = test_app(unlimited_config()).await;

        let (status, body) = send(
            &app,
            post_json("/api/v1/analyzer/create", json!({ "createdBy": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "E_VALIDATION_FAILED");
        assert_eq!(
            body["errors"],
            json!(["\"content\" is required", "\"createdBy\" must be a number"])
        );

        let (status, body) = send(
            &app,
            post_json("/api/v1/analyzer/create", json!({ "content": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"], json!(["\"content\" is not allowed to be empty"]));
    }

    #[tokio::test]
    async fn test_create_without_json_content_type() {
        let app = test_app(unlimited_config()).await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/analyzer/create")
            .body(Body::from("content=hello"))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"], json!(["\"content\" is required"]));
    }

    #[tokio::test]
    async fn test_create_with_empty_json_body() {
        let app = test_app(unlimited_config()).await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/analyzer/create")
            .header("content-type", "application/json")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"], json!(["\"content\" is required"]));
    }

    #[tokio::test]
    async fn test_create_with_malformed_json() {
        let app = test_app(unlimited_config()).await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/analyzer/create")
            .header("content-type", "application/json")
            .body(Body::from("{\"content\":"))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "E_VALIDATION_FAILED");
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_requires_analyzer_id() {
        let app = test_app(unlimited_config()).await;

        let (status, body) = send(&app, get("/api/v1/analyzer/words-count")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"], json!(["\"analyzerId\" is required"]));
    }

    #[tokio::test]
    async fn test_unknown_analyzer_is_bad_request() {
        let app = test_app(unlimited_config()).await;
        let missing = uuid::Uuid::new_v4();

        let (status, body) = send(
            &app,
            get(&format!("/api/v1/analyzer/longest-word?analyzerId={missing}")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
        assert_eq!(body["message"], "Analyzer not found");
        assert_eq!(body["errors"], json!(["Analyzer not found"]));
    }

    #[tokio::test]
    async fn test_malformed_analyzer_id_is_internal_error() {
        let app = test_app(unlimited_config()).await;

        let (status, body) = send(&app, get("/api/v1/analyzer/words-count?analyzerId=abc")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "E_INTERNAL_SERVER_ERROR");
        assert_eq!(body["message"], "Internal Server Error");
    }

    #[tokio::test]
    async fn test_create_and_read_limits_are_separate() {
        let mut config = unlimited_config();
        config.rate_limit.enabled = true;
        config.rate_limit.window = Duration::from_secs(60);
        config.rate_limit.create_max = 1;
        config.rate_limit.read_max = 2;
        let app = test_app(config).await;

        let id = create(&app, "limited").await;
        let (status, body) = send(
            &app,
            post_json("/api/v1/analyzer/create", json!({ "content": "again" })),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["code"], "E_TOO_MANY_REQUESTS");

        let uri = format!("/api/v1/analyzer/words-count?analyzerId={id}");
        assert_eq!(send(&app, get(&uri)).await.0, StatusCode::OK);
        assert_eq!(send(&app, get(&uri)).await.0, StatusCode::OK);
        assert_eq!(send(&app, get(&uri)).await.0, StatusCode::TOO_MANY_REQUESTS);
    }
}
