// src/core/source/youtube.rs

//! A comment source backed by the YouTube Data API v3.
//!
//! Each fetch picks one trending video at random from the configured region
//! and pulls its most relevant top-level comments.

use super::{CommentFilter, CommentSource};
use crate::config::SourceConfig;
use crate::core::RouletteError;
use crate::core::comment::CommentRecord;
use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

/// `videos.list` response, trimmed to the fields used here.
#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<Video>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    pub id: String,
    pub snippet: VideoSnippet,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoSnippet {
    #[serde(default)]
    pub title: String,
}

/// `commentThreads.list` response, trimmed to the fields used here.
#[derive(Debug, Deserialize)]
pub struct CommentThreadListResponse {
    #[serde(default)]
    pub items: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
pub struct CommentThread {
    pub snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadSnippet {
    pub top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
pub struct TopLevelComment {
    pub snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSnippet {
    pub text_display: String,
    pub author_display_name: String,
}

/// Converts a comment thread page into cacheable records, dropping anything
/// the filter rejects.
pub fn extract_comments(
    response: CommentThreadListResponse,
    filter: &CommentFilter,
) -> Vec<CommentRecord> {
    response
        .items
        .into_iter()
        .map(|thread| thread.snippet.top_level_comment.snippet)
        .filter(|comment| filter.accepts(&comment.text_display))
        .map(|comment| CommentRecord::new(comment.text_display, comment.author_display_name))
        .collect()
}

pub struct YouTubeSource {
    client: reqwest::Client,
    api_base: Url,
    api_key: String,
    region_code: String,
    max_videos: u32,
    max_comments: u32,
    filter: CommentFilter,
}

/// Carries the API key so it never appears in a request URL.
pub const API_KEY_HEADER: &str = "X-Goog-Api-Key";

impl YouTubeSource {
    pub fn new(config: &SourceConfig, api_key: String) -> Result<Self, RouletteError> {
        let api_base = Url::parse(&config.api_base).map_err(|e| {
            RouletteError::Config(format!("invalid API base '{}': {e}", config.api_base))
        })?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            api_base,
            api_key,
            region_code: config.region_code.clone(),
            max_videos: config.max_videos,
            max_comments: config.max_comments,
            filter: CommentFilter::from(config),
        })
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/{resource}", self.api_base.as_str().trim_end_matches('/'))
    }

    /// Issues a GET and decodes the JSON body. Non-success statuses, such as
    /// a video with comments disabled, become `SourceUnavailable`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, String)],
    ) -> Result<T, RouletteError> {
        let res = self
            .client
            .get(self.endpoint(resource))
            .header(API_KEY_HEADER, self.api_key.as_str())
            .query(query)
            .send()
            .await
            .map_err(|e| {
                RouletteError::SourceUnavailable(format!(
                    "{resource} request failed: {}",
                    e.without_url()
                ))
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(RouletteError::SourceUnavailable(format!(
                "{resource} responded with status {status}: {}",
                api_error_message(&body)
            )));
        }

        let body = res.bytes().await.map_err(|e| {
            RouletteError::SourceUnavailable(format!(
                "{resource} body could not be read: {}",
                e.without_url()
            ))
        })?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn pick_trending_video(&self) -> Result<Video, RouletteError> {
        let videos: VideoListResponse = self
            .get_json(
                "videos",
                &[
                    ("part", "snippet,id".to_string()),
                    ("chart", "mostPopular".to_string()),
                    ("regionCode", self.region_code.clone()),
                    ("maxResults", self.max_videos.to_string()),
                ],
            )
            .await?;

        let mut rng = SmallRng::from_entropy();
        videos.items.choose(&mut rng).cloned().ok_or_else(|| {
            RouletteError::SourceUnavailable("trending video list was empty".to_string())
        })
    }
}

#[async_trait]
impl CommentSource for YouTubeSource {
    async fn fetch_batch(&self) -> Result<Vec<CommentRecord>, RouletteError> {
        let video = self.pick_trending_video().await?;
        info!("Selected video '{}' (ID: {})", video.snippet.title, video.id);

        let threads: CommentThreadListResponse = self
            .get_json(
                "commentThreads",
                &[
                    ("part", "snippet".to_string()),
                    ("videoId", video.id.clone()),
                    ("maxResults", self.max_comments.to_string()),
                    ("order", "relevance".to_string()),
                ],
            )
            .await?;

        let fetched = threads.items.len();
        let comments = extract_comments(threads, &self.filter);
        debug!(
            "Kept {} of {} comments from video {}.",
            comments.len(),
            fetched,
            video.id
        );
        Ok(comments)
    }

    fn name(&self) -> &str {
        "youtube"
    }
}

/// Pulls `error.message` out of a Google API error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect())
}
