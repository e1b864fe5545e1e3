// src/config.rs

//! Manages service configuration: loading, resolving derived values, and validation.

use crate::core::cache::{DEFAULT_TARGET_SIZE, WarmUpOptions};
use crate::core::tasks::refill::DEFAULT_REFILL_INTERVAL;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::time::Duration;
use url::Url;

/// Sizing and timing of the comment cache.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CacheConfig {
    /// The refill loop stops calling the source once this many comments are cached.
    #[serde(default = "default_target_size")]
    pub target_size: usize,
    /// The size the startup warm-up must reach. Defaults to half the target.
    #[serde(default)]
    pub warmup_min_size: Option<usize>,
    #[serde(with = "humantime_serde", default = "default_refill_interval")]
    pub refill_interval: Duration,
    #[serde(with = "humantime_serde", default = "default_warmup_interval")]
    pub warmup_interval: Duration,
    /// Gives up warming up after this many source calls. `0` means never give up.
    #[serde(default)]
    pub warmup_max_attempts: u32,
}

fn default_target_size() -> usize {
    DEFAULT_TARGET_SIZE
}
fn default_refill_interval() -> Duration {
    DEFAULT_REFILL_INTERVAL
}
fn default_warmup_interval() -> Duration {
    Duration::from_secs(3)
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            target_size: default_target_size(),
            warmup_min_size: None,
            refill_interval: default_refill_interval(),
            warmup_interval: default_warmup_interval(),
            warmup_max_attempts: 0,
        }
    }
}

impl CacheConfig {
    /// The warm-up threshold: the configured value or half the target size.
    pub fn resolved_warmup_min_size(&self) -> usize {
        self.warmup_min_size.unwrap_or(self.target_size / 2)
    }

    pub fn warm_up_options(&self) -> WarmUpOptions {
        WarmUpOptions {
            min_size: self.resolved_warmup_min_size(),
            interval: self.warmup_interval,
            max_attempts: self.warmup_max_attempts,
        }
    }
}

/// Settings for the YouTube comment source.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SourceConfig {
    /// A file holding the API key. The `YOUTUBE_API_KEY` environment variable takes precedence.
    #[serde(default = "default_api_key_file")]
    pub api_key_file: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// The region whose trending chart videos are picked from.
    #[serde(default = "default_region_code")]
    pub region_code: String,
    #[serde(default = "default_max_videos")]
    pub max_videos: u32,
    #[serde(default = "default_max_comments")]
    pub max_comments: u32,
    /// Exclusive lower bound on comment length, in characters.
    #[serde(default = "default_min_text_len")]
    pub min_text_len: usize,
    /// Exclusive upper bound on comment length, in characters.
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,
    #[serde(default = "default_blocked_substrings")]
    pub blocked_substrings: Vec<String>,
    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,
}

fn default_api_key_file() -> String {
    ".key".to_string()
}
fn default_api_base() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}
fn default_region_code() -> String {
    "KR".to_string()
}
fn default_max_videos() -> u32 {
    50
}
fn default_max_comments() -> u32 {
    100
}
fn default_min_text_len() -> usize {
    10
}
fn default_max_text_len() -> usize {
    150
}
fn default_blocked_substrings() -> Vec<String> {
    vec!["http".to_string()]
}
fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_key_file: default_api_key_file(),
            api_base: default_api_base(),
            region_code: default_region_code(),
            max_videos: default_max_videos(),
            max_comments: default_max_comments(),
            min_text_len: default_min_text_len(),
            max_text_len: default_max_text_len(),
            blocked_substrings: default_blocked_substrings(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Configuration for the Prometheus metrics exporter.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MetricsConfig {
    /// If true, a second HTTP server exposes Prometheus metrics on `/metrics`.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

fn default_metrics_port() -> u16 {
    9878
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

/// The complete, validated service configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            cache: CacheConfig::default(),
            source: SourceConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Where a loaded `Config` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    File,
    Defaults,
}

impl Config {
    /// Creates a new `Config` by reading and parsing a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid configuration in '{path}'"))
    }

    /// Like `from_file`, but a missing file yields the built-in defaults.
    /// The returned origin lets the caller report the fallback once logging
    /// is up.
    pub fn from_file_or_default(path: &str) -> Result<(Self, ConfigOrigin)> {
        match fs::metadata(path) {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let config = Config::default();
                config.validate()?;
                Ok((config, ConfigOrigin::Defaults))
            }
            _ => Ok((Self::from_file(path)?, ConfigOrigin::File)),
        }
    }

    /// Applies a command-line port and re-runs validation, so the override
    /// cannot collide with the metrics port.
    pub fn with_port(mut self, port: u16) -> Result<Self> {
        self.port = port;
        self.validate()?;
        Ok(self)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// The address the HTTP server binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the configuration to ensure logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("port cannot be 0"));
        }
        if self.host.trim().is_empty() {
            return Err(anyhow!("host cannot be empty"));
        }

        let cache = &self.cache;
        if cache.target_size == 0 {
            return Err(anyhow!("cache.target_size cannot be 0"));
        }
        if cache.resolved_warmup_min_size() > cache.target_size {
            return Err(anyhow!(
                "cache.warmup_min_size ({}) cannot exceed cache.target_size ({})",
                cache.resolved_warmup_min_size(),
                cache.target_size
            ));
        }
        if cache.refill_interval.is_zero() {
            return Err(anyhow!("cache.refill_interval cannot be 0"));
        }
        if cache.warmup_interval.is_zero() {
            return Err(anyhow!("cache.warmup_interval cannot be 0"));
        }

        let source = &self.source;
        Url::parse(&source.api_base)
            .with_context(|| format!("source.api_base '{}' is not a valid URL", source.api_base))?;
        if source.min_text_len >= source.max_text_len {
            return Err(anyhow!(
                "source.min_text_len must be smaller than source.max_text_len"
            ));
        }
        if !(1..=50).contains(&source.max_videos) {
            return Err(anyhow!("source.max_videos must be between 1 and 50"));
        }
        if !(1..=100).contains(&source.max_comments) {
            return Err(anyhow!("source.max_comments must be between 1 and 100"));
        }
        if source.region_code.trim().is_empty() {
            return Err(anyhow!("source.region_code cannot be empty"));
        }

        if self.metrics.enabled {
            if self.metrics.port == 0 {
                return Err(anyhow!("metrics.port cannot be 0"));
            }
            if self.metrics.port == self.port {
                return Err(anyhow!(
                    "metrics.port cannot be the same as the main server port"
                ));
            }
        }
        Ok(())
    }
}
