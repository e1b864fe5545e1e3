// src/core/source/filter.rs

use crate::config::SourceConfig;

/// Length and content rules a comment must pass before it is cached.
#[derive(Debug, Clone)]
pub struct CommentFilter {
    /// Exclusive lower bound on the character count.
    pub min_len: usize,
    /// Exclusive upper bound on the character count.
    pub max_len: usize,
    /// Texts containing any of these substrings are dropped.
    pub blocked_substrings: Vec<String>,
}

impl Default for CommentFilter {
    fn default() -> Self {
        Self {
            min_len: 10,
            max_len: 150,
            blocked_substrings: vec!["http".to_string()],
        }
    }
}

impl From<&SourceConfig> for CommentFilter {
    fn from(config: &SourceConfig) -> Self {
        Self {
            min_len: config.min_text_len,
            max_len: config.max_text_len,
            blocked_substrings: config.blocked_substrings.clone(),
        }
    }
}

impl CommentFilter {
    /// Lengths are counted in characters, not bytes, so multi-byte scripts
    /// are measured the way a reader sees them.
    pub fn accepts(&self, text: &str) -> bool {
        let len = text.chars().count();
        if len <= self.min_len || len >= self.max_len {
            return false;
        }
        !self
            .blocked_substrings
            .iter()
            .any(|blocked| text.contains(blocked.as_str()))
    }
}
