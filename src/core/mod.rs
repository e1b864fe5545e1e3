// src/core/mod.rs

//! The central module containing the comment cache and its collaborators.

pub mod cache;
pub mod comment;
pub mod errors;
pub mod metrics;
pub mod source;
pub mod tasks;

pub use cache::CommentCache;
pub use comment::CommentRecord;
pub use errors::RouletteError;
