// src/core/source/mod.rs

//! The comment source collaborator: anything that can hand the cache a batch
//! of ready-to-serve comments.

pub mod filter;
pub mod youtube;

use crate::config::SourceConfig;
use crate::core::RouletteError;
use crate::core::comment::CommentRecord;
use async_trait::async_trait;
use std::fs;
use std::sync::Arc;
use tracing::{info, warn};

pub use filter::CommentFilter;
pub use youtube::YouTubeSource;

/// The environment variable that overrides the API key file.
pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// A provider of comment batches. Latency and availability are outside the
/// cache's control, so callers must treat every call as fallible.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Fetches one batch of filtered records. An empty batch is a valid
    /// success.
    async fn fetch_batch(&self) -> Result<Vec<CommentRecord>, RouletteError>;

    /// A short name used in log lines.
    fn name(&self) -> &str;

    /// False when the source can never succeed, e.g. no credential was found.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// The stand-in used when no API credential is configured. Every fetch fails.
#[derive(Debug, Default)]
pub struct DisabledSource {
    reason: String,
}

impl DisabledSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl CommentSource for DisabledSource {
    async fn fetch_batch(&self) -> Result<Vec<CommentRecord>, RouletteError> {
        Err(RouletteError::SourceUnavailable(self.reason.clone()))
    }

    fn name(&self) -> &str {
        "disabled"
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Resolves the API key: the environment wins, then the key file.
/// Returns `None` when neither yields a non-empty value.
pub fn load_api_key(config: &SourceConfig) -> Option<String> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        let key = key.trim().to_string();
        if !key.is_empty() {
            info!("Using API key from the {} environment variable.", API_KEY_ENV);
            return Some(key);
        }
    }

    match fs::read_to_string(&config.api_key_file) {
        Ok(contents) => {
            let key = contents.trim().to_string();
            if key.is_empty() {
                warn!("API key file '{}' is empty.", config.api_key_file);
                None
            } else {
                Some(key)
            }
        }
        Err(e) => {
            warn!(
                "Could not read API key file '{}': {}",
                config.api_key_file, e
            );
            None
        }
    }
}

/// Builds the configured comment source. A missing credential or a client
/// that fails to build yields a `DisabledSource`; the service still starts.
pub fn build_source(config: &SourceConfig) -> Arc<dyn CommentSource> {
    let Some(api_key) = load_api_key(config) else {
        warn!("No API key available. The comment source is disabled and the cache will stay empty.");
        return Arc::new(DisabledSource::new("no API key configured"));
    };

    match YouTubeSource::new(config, api_key) {
        Ok(source) => {
            info!(
                "YouTube comment source ready (region {}).",
                config.region_code
            );
            Arc::new(source)
        }
        Err(e) => {
            warn!("Failed to initialize the YouTube client: {}", e);
            Arc::new(DisabledSource::new(e.to_string()))
        }
    }
}
