//! Plain text API routes

use axum::{
    extract::State,
    middleware,
    routing::post,
    Json, Router,
};

use crate::db::{CreateText, Text};
use crate::error::Result;
use crate::middleware::enforce_rate_limit;
use crate::response::{self, Envelope};
use crate::state::AppState;
use crate::validation::{Field, FieldKind, Schema};

use super::JsonBody;

const CREATE_SCHEMA: Schema = Schema::new(&[Field::required("content", FieldKind::String)]);

/// Create the text router
pub fn router(state: &AppState) -> Router<AppState> {
    let router = Router::new().route("/create", post(create_text));

    match state.rate_limiters() {
        Some(limiters) => router.route_layer(middleware::from_fn_with_state(
            limiters.create.clone(),
            enforce_rate_limit,
        )),
        None => router,
    }
}

async fn create_text(
    State(state): State<AppState>,
    JsonBody(input): JsonBody,
) -> Result<Json<Envelope<Text>>> {
    let data: CreateText = CREATE_SCHEMA.parse(&input)?;

    let text = state.text_service().create(data).await?;
    Ok(response::success(text))
}
