// tests/integration/http_test.rs

//! Integration tests for the HTTP surface
//! Tests: GET /, GET /api/random-comment

use super::test_helpers::{ScriptedSource, TestServer, init_tracing, numbered_batch};
use comment_roulette::core::{CommentCache, CommentRecord};
use comment_roulette::server::routes;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::test]
async fn test_random_comment_on_empty_cache_returns_503() {
    init_tracing();
    let cache = Arc::new(CommentCache::new(100));
    let server = TestServer::start(routes::router(cache.clone())).await;

    let res = reqwest::get(server.url("/api/random-comment")).await.unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let content_type = res.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("application/json"));
    let body: Value = res.json().await.unwrap();
    let message = body["error"].as_str().expect("error body must be a string");
    assert!(!message.is_empty());
    assert!(cache.is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_random_comment_returns_cached_record() {
    init_tracing();
    let cache = Arc::new(CommentCache::new(100));
    cache
        .refill_once(&ScriptedSource::repeating(numbered_batch(0, 10)))
        .await;
    let cached: HashSet<_> = cache.snapshot().into_iter().collect();
    let server = TestServer::start(routes::router(cache.clone())).await;

    for _ in 0..20 {
        let res = reqwest::get(server.url("/api/random-comment")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body: Value = res.json().await.unwrap();
        let object = body.as_object().unwrap();
        assert_eq!(object.len(), 2, "body must carry exactly text and author");
        let record: CommentRecord = serde_json::from_value(body).unwrap();
        assert!(cached.contains(&record));
    }

    server.stop().await;
}

#[tokio::test]
async fn test_random_comment_starts_serving_after_refill() {
    let cache = Arc::new(CommentCache::new(100));
    let server = TestServer::start(routes::router(cache.clone())).await;

    let res = reqwest::get(server.url("/api/random-comment")).await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    cache
        .refill_once(&ScriptedSource::repeating(numbered_batch(0, 1)))
        .await;

    let res = reqwest::get(server.url("/api/random-comment")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let record: CommentRecord = res.json().await.unwrap();
    assert_eq!(record, numbered_batch(0, 1)[0]);

    server.stop().await;
}

#[tokio::test]
async fn test_landing_page_is_served() {
    let cache = Arc::new(CommentCache::new(100));
    let server = TestServer::start(routes::router(cache)).await;

    let res = reqwest::get(server.url("/")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let body = res.text().await.unwrap();
    assert!(body.contains("/api/random-comment"));

    server.stop().await;
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let cache = Arc::new(CommentCache::new(100));
    let server = TestServer::start(routes::router(cache)).await;

    let res = reqwest::get(server.url("/api/nope")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    server.stop().await;
}
