// src/core/comment.rs

//! The record served to clients and the buffer that holds it.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single viewer comment. Two records are the same comment when both
/// the text and the author match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentRecord {
    pub text: String,
    pub author: String,
}

impl CommentRecord {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
        }
    }
}

/// The in-memory pool of cached comments.
///
/// `seen` mirrors `items` exactly and acts as the dedup filter keyed by
/// `(text, author)`. The buffer only ever grows.
#[derive(Debug, Default)]
pub struct CommentBuffer {
    items: Vec<CommentRecord>,
    seen: HashSet<CommentRecord>,
}

impl CommentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends every record of `batch` not already held, then shuffles the
    /// whole buffer. Returns how many records were actually added.
    pub fn merge(&mut self, batch: Vec<CommentRecord>) -> usize {
        let before = self.items.len();
        for record in batch {
            if self.seen.insert(record.clone()) {
                self.items.push(record);
            }
        }
        let mut rng = SmallRng::from_entropy();
        self.items.shuffle(&mut rng);
        self.items.len() - before
    }

    /// Returns a copy of one record chosen uniformly at random.
    pub fn choose(&self) -> Option<CommentRecord> {
        if self.items.is_empty() {
            return None;
        }
        let mut rng = SmallRng::from_entropy();
        let index = rng.gen_range(0..self.items.len());
        Some(self.items[index].clone())
    }

    pub fn contains(&self, record: &CommentRecord) -> bool {
        self.seen.contains(record)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommentRecord> {
        self.items.iter()
    }
}
