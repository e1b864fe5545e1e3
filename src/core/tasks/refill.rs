// src/core/tasks/refill.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::core::cache::CommentCache;
use crate::core::source::CommentSource;

/// The default pause between refill attempts.
pub const DEFAULT_REFILL_INTERVAL: Duration = Duration::from_secs(120);

/// A task that keeps the comment cache topped up from a comment source.
pub struct RefillTask {
    cache: Arc<CommentCache>,
    source: Arc<dyn CommentSource>,
    interval: Duration,
}

impl RefillTask {
    pub fn new(
        cache: Arc<CommentCache>,
        source: Arc<dyn CommentSource>,
        interval: Duration,
    ) -> Self {
        Self {
            cache,
            source,
            interval,
        }
    }

    /// Runs `refill_once` and then waits a fixed interval, until shutdown.
    /// There is no backoff: a failing source is retried on the next tick.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!(
            "Comment refill task started (source '{}', every {:?}).",
            self.source.name(),
            self.interval
        );

        loop {
            tokio::select! {
                outcome = self.cache.refill_once(self.source.as_ref()) => {
                    debug!("Refill cycle finished: {:?}", outcome);
                }
                _ = shutdown_rx.recv() => {
                    info!("Comment refill task shutting down.");
                    return;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown_rx.recv() => {
                    info!("Comment refill task shutting down.");
                    return;
                }
            }
        }
    }
}
