// src/server/metrics_server.rs

use crate::core::CommentCache;
use crate::core::metrics::{CACHE_SIZE, gather_metrics};
use anyhow::{Context, Result};
use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// Handles HTTP requests to the /metrics endpoint.
///
/// The cache size gauge is refreshed before gathering so a scrape never
/// reports a stale value between refills.
async fn metrics_handler(cache: Arc<CommentCache>) -> impl IntoResponse {
    CACHE_SIZE.set(cache.len() as f64);

    let body = gather_metrics();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        body,
    )
}

/// Builds the router serving Prometheus text on /metrics.
pub fn metrics_router(cache: Arc<CommentCache>) -> Router {
    Router::new().route("/metrics", get(move || metrics_handler(cache.clone())))
}

/// Runs a small HTTP server exposing Prometheus metrics on /metrics.
pub async fn run_metrics_server(
    cache: Arc<CommentCache>,
    addr: String,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
    let app = metrics_router(cache);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind metrics server on {addr}"))?;
    info!("Prometheus metrics server listening on http://{}/metrics", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_rx.recv().await.ok();
            info!("Metrics server shutting down.");
        })
        .await
        .context("Metrics server failed")
}
