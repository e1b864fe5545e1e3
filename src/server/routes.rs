// src/server/routes.rs

//! The public HTTP surface: a landing page and the random comment API.

use crate::core::{CommentCache, CommentRecord, RouletteError};
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Builds the service router. Handlers only read the cache; none of them
/// ever reach the comment source.
pub fn router(cache: Arc<CommentCache>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/random-comment", get(random_comment))
        .with_state(cache)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `200 {"text", "author"}`, or `503 {"error"}` while the cache is empty.
async fn random_comment(
    State(cache): State<Arc<CommentCache>>,
) -> Result<Json<CommentRecord>, RouletteError> {
    cache.pick_random().map(Json)
}
