// tests/integration/youtube_source_test.rs

//! Integration tests for the YouTube comment source against a mock API

use super::test_helpers::{API_KEY_ENV_LOCK, MockYouTube, TestServer, init_tracing};
use comment_roulette::config::SourceConfig;
use comment_roulette::core::source::{
    API_KEY_ENV, CommentSource, YouTubeSource, build_source, load_api_key,
};
use comment_roulette::core::{CommentCache, CommentRecord, RouletteError};
use std::io::Write;
use std::sync::Arc;

fn config_for(server: &TestServer) -> SourceConfig {
    SourceConfig {
        api_base: server.base_url.clone(),
        ..SourceConfig::default()
    }
}

#[tokio::test]
async fn test_fetch_batch_returns_filtered_comments() {
    init_tracing();
    let mock = Arc::new(MockYouTube::default().with_video(
        "vid1",
        &[
            ("What a performance, chills every time", "@fan"),
            ("too short", "@brief"),
            ("link in bio http://spam.example", "@bot"),
            ("Came back to this after five years", "@nostalgic"),
        ],
    ));
    let server = TestServer::start(mock.clone().router()).await;
    let source = YouTubeSource::new(&config_for(&server), "test-key".to_string()).unwrap();

    let batch = source.fetch_batch().await.unwrap();

    assert_eq!(
        batch,
        vec![
            CommentRecord::new("What a performance, chills every time", "@fan"),
            CommentRecord::new("Came back to this after five years", "@nostalgic"),
        ]
    );
    server.stop().await;
}

#[tokio::test]
async fn test_fetch_batch_sends_expected_query() {
    let mock = Arc::new(MockYouTube::default().with_video("vid1", &[]));
    let server = TestServer::start(mock.clone().router()).await;
    let source = YouTubeSource::new(&config_for(&server), "secret-key".to_string()).unwrap();

    let batch = source.fetch_batch().await.unwrap();
    assert!(batch.is_empty());

    assert_eq!(mock.seen_keys.lock().as_slice(), ["secret-key".to_string()]);
    let queries = mock.seen_queries.lock();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0]["chart"], "mostPopular");
    assert_eq!(queries[0]["regionCode"], "KR");
    assert_eq!(queries[0]["maxResults"], "50");
    assert_eq!(queries[1]["videoId"], "vid1");
    assert_eq!(queries[1]["maxResults"], "100");
    assert_eq!(queries[1]["order"], "relevance");
    assert!(queries.iter().all(|q| !q.contains_key("key")));
    drop(queries);

    server.stop().await;
}

#[tokio::test]
async fn test_fetch_batch_with_comments_disabled_fails() {
    init_tracing();
    let mock = Arc::new(MockYouTube::default().with_comments_disabled("locked"));
    let server = TestServer::start(mock.clone().router()).await;
    let source = YouTubeSource::new(&config_for(&server), "k".to_string()).unwrap();

    let err = source.fetch_batch().await.unwrap_err();

    match err {
        RouletteError::SourceUnavailable(msg) => {
            assert!(msg.contains("403"));
            assert!(msg.contains("disabled comments"));
        }
        other => panic!("Expected SourceUnavailable, got {other:?}"),
    }
    server.stop().await;
}

#[tokio::test]
async fn test_fetch_batch_with_no_trending_videos_fails() {
    let mock = Arc::new(MockYouTube::default());
    let server = TestServer::start(mock.clone().router()).await;
    let source = YouTubeSource::new(&config_for(&server), "k".to_string()).unwrap();

    let err = source.fetch_batch().await.unwrap_err();
    assert!(matches!(err, RouletteError::SourceUnavailable(_)));

    server.stop().await;
}

#[tokio::test]
async fn test_unreachable_api_is_source_unavailable() {
    let config = SourceConfig {
        api_base: "http://127.0.0.1:1".to_string(),
        ..SourceConfig::default()
    };
    let source = YouTubeSource::new(&config, "k".to_string()).unwrap();

    let err = source.fetch_batch().await.unwrap_err();
    assert!(matches!(err, RouletteError::SourceUnavailable(_)));
}

#[tokio::test]
async fn test_unreachable_api_error_omits_api_key() {
    let config = SourceConfig {
        api_base: "http://127.0.0.1:1".to_string(),
        ..SourceConfig::default()
    };
    let source = YouTubeSource::new(&config, "SUPERSECRETKEY".to_string()).unwrap();

    let err = source.fetch_batch().await.unwrap_err();

    let message = err.to_string();
    assert!(message.contains("videos request failed"));
    assert!(!message.contains("SUPERSECRETKEY"));
}

#[tokio::test]
async fn test_http_client_error_conversion_drops_url() {
    let err = reqwest::Client::new()
        .get("http://127.0.0.1:1/videos?key=SUPERSECRETKEY")
        .send()
        .await
        .unwrap_err();

    let converted = RouletteError::from(err);

    assert!(matches!(converted, RouletteError::HttpClientError(_)));
    assert!(!converted.to_string().contains("SUPERSECRETKEY"));
}

#[tokio::test]
async fn test_failed_fetch_leaves_cache_empty() {
    init_tracing();
    let mock = Arc::new(MockYouTube::default().with_comments_disabled("locked"));
    let server = TestServer::start(mock.clone().router()).await;
    let source = YouTubeSource::new(&config_for(&server), "k".to_string()).unwrap();
    let cache = CommentCache::new(100);

    cache.refill_once(&source).await;

    assert!(cache.is_empty());
    assert!(cache.pick_random().is_err());
    server.stop().await;
}

#[tokio::test]
async fn test_build_source_without_key_is_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let config = SourceConfig {
        api_key_file: dir.path().join("missing.key").to_str().unwrap().to_string(),
        ..SourceConfig::default()
    };

    let source = {
        let _env = API_KEY_ENV_LOCK.lock();
        if std::env::var(API_KEY_ENV).is_ok() {
            return;
        }
        build_source(&config)
    };

    assert!(!source.is_enabled());
    assert!(matches!(
        source.fetch_batch().await,
        Err(RouletteError::SourceUnavailable(_))
    ));
}

#[test]
fn test_load_api_key_trims_file_contents() {
    let _env = API_KEY_ENV_LOCK.lock();
    if std::env::var(API_KEY_ENV).is_ok() {
        return;
    }
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "  AIza-example-key  ").unwrap();
    let config = SourceConfig {
        api_key_file: file.path().to_str().unwrap().to_string(),
        ..SourceConfig::default()
    };

    assert_eq!(load_api_key(&config).as_deref(), Some("AIza-example-key"));
}

#[test]
fn test_load_api_key_rejects_blank_file() {
    let _env = API_KEY_ENV_LOCK.lock();
    if std::env::var(API_KEY_ENV).is_ok() {
        return;
    }
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "   ").unwrap();
    let config = SourceConfig {
        api_key_file: file.path().to_str().unwrap().to_string(),
        ..SourceConfig::default()
    };

    assert_eq!(load_api_key(&config), None);
}

#[test]
fn test_load_api_key_prefers_environment_over_file() {
    let _env = API_KEY_ENV_LOCK.lock();
    let previous = std::env::var(API_KEY_ENV).ok();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "key-from-file").unwrap();
    let config = SourceConfig {
        api_key_file: file.path().to_str().unwrap().to_string(),
        ..SourceConfig::default()
    };

    // SAFETY: every test touching this variable holds API_KEY_ENV_LOCK.
    unsafe { std::env::set_var(API_KEY_ENV, "  key-from-env  ") };
    let from_env = load_api_key(&config);
    // A blank variable falls through to the file.
    unsafe { std::env::set_var(API_KEY_ENV, "   ") };
    let from_blank_env = load_api_key(&config);

    match previous {
        Some(value) => unsafe { std::env::set_var(API_KEY_ENV, value) },
        None => unsafe { std::env::remove_var(API_KEY_ENV) },
    }

    assert_eq!(from_env.as_deref(), Some("key-from-env"));
    assert_eq!(from_blank_env.as_deref(), Some("key-from-file"));
}
