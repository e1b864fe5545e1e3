// src/server/context.rs

use crate::config::Config;
use crate::core::CommentCache;
use crate::core::source::CommentSource;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinSet;

/// Holds all the initialized state required to run the service.
pub struct ServerContext {
    pub config: Config,
    pub cache: Arc<CommentCache>,
    pub source: Arc<dyn CommentSource>,
    pub shutdown_tx: broadcast::Sender<()>,
    pub background_tasks: JoinSet<Result<(), anyhow::Error>>,
}
