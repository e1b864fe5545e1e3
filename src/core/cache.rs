// src/core/cache.rs

//! The shared comment cache: a bounded, deduplicated, shuffled buffer filled
//! from a comment source and read by the HTTP layer.

use crate::core::RouletteError;
use crate::core::comment::{CommentBuffer, CommentRecord};
use crate::core::metrics;
use crate::core::source::CommentSource;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex as AsyncMutex, broadcast};
use tracing::{debug, info, warn};

/// The default number of comments the refill loop aims to hold.
pub const DEFAULT_TARGET_SIZE: usize = 100;

/// What a single `refill_once` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefillOutcome {
    /// The buffer was already at or above the target; the source was not called.
    Skipped { len: usize },
    /// A batch was fetched and merged.
    Merged {
        fetched: usize,
        added: usize,
        len: usize,
    },
    /// The source succeeded but returned no records.
    NothingFetched,
    /// The source failed; the buffer is unchanged.
    Failed,
}

/// How the startup warm-up ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmUpStatus {
    Ready,
    Cancelled,
    AttemptsExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmUpOutcome {
    pub status: WarmUpStatus,
    pub attempts: u32,
    pub len: usize,
}

/// Settings for the blocking startup fill.
#[derive(Debug, Clone, Copy)]
pub struct WarmUpOptions {
    pub min_size: usize,
    /// Pause between source calls, taken after every attempt.
    pub interval: Duration,
    /// `0` keeps trying until the buffer is full enough or shutdown arrives.
    pub max_attempts: u32,
}

/// Owns the comment buffer and the two locks guarding it.
///
/// `buffer` is a short-lived lock, never held across an `.await`, guarding
/// every read and every merge. `refill_lock` serializes refills and is held
/// for a refill's whole check-fetch-merge, so two refills can never both pass
/// the size check. Readers never touch `refill_lock`, so a read never waits
/// on the comment source.
#[derive(Debug)]
pub struct CommentCache {
    buffer: Mutex<CommentBuffer>,
    refill_lock: AsyncMutex<()>,
    target_size: usize,
}

impl Default for CommentCache {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_SIZE)
    }
}

impl CommentCache {
    pub fn new(target_size: usize) -> Self {
        Self {
            buffer: Mutex::new(CommentBuffer::new()),
            refill_lock: AsyncMutex::new(()),
            target_size,
        }
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    /// Copies every cached record out of the buffer.
    pub fn snapshot(&self) -> Vec<CommentRecord> {
        self.buffer.lock().iter().cloned().collect()
    }

    /// Returns one cached record chosen uniformly at random.
    pub fn pick_random(&self) -> Result<CommentRecord, RouletteError> {
        let picked = self.buffer.lock().choose();
        match picked {
            Some(record) => {
                metrics::RANDOM_COMMENT_REQUESTS_TOTAL
                    .with_label_values(&["hit"])
                    .inc();
                Ok(record)
            }
            None => {
                metrics::RANDOM_COMMENT_REQUESTS_TOTAL
                    .with_label_values(&["empty"])
                    .inc();
                Err(RouletteError::EmptyCache)
            }
        }
    }

    /// Tops the buffer up with one batch from `source` unless it already
    /// holds `target_size` records. Source failures are logged and absorbed.
    pub async fn refill_once(&self, source: &dyn CommentSource) -> RefillOutcome {
        let _refill_guard = self.refill_lock.lock().await;

        let len = self.len();
        if len >= self.target_size {
            debug!(
                "Cache holds {} comments (target {}). Skipping refill.",
                len, self.target_size
            );
            return RefillOutcome::Skipped { len };
        }

        info!("Cache holds {} comments. Fetching a new batch.", len);
        self.fetch_and_merge(source).await
    }

    /// Fills the buffer to at least `options.min_size` before the service
    /// takes traffic, ignoring the target size. Every attempt is followed by
    /// `options.interval` of sleep, whether or not it added anything.
    pub async fn warm_up(
        &self,
        source: &dyn CommentSource,
        options: WarmUpOptions,
        shutdown_rx: &mut broadcast::Receiver<()>,
    ) -> WarmUpOutcome {
        let mut attempts = 0u32;

        loop {
            let len = self.len();
            if len >= options.min_size {
                return WarmUpOutcome {
                    status: WarmUpStatus::Ready,
                    attempts,
                    len,
                };
            }
            if options.max_attempts > 0 && attempts >= options.max_attempts {
                warn!(
                    "Warm-up gave up after {} attempts with {} of {} comments.",
                    attempts, len, options.min_size
                );
                return WarmUpOutcome {
                    status: WarmUpStatus::AttemptsExhausted,
                    attempts,
                    len,
                };
            }

            attempts += 1;
            let filled = {
                let _refill_guard = self.refill_lock.lock().await;
                self.fetch_and_merge(source).await
            };
            if let RefillOutcome::Merged { len, .. } = filled {
                info!(
                    "Warming up cache... {} of {} comments.",
                    len, options.min_size
                );
            }

            tokio::select! {
                _ = tokio::time::sleep(options.interval) => {}
                _ = shutdown_rx.recv() => {
                    info!("Warm-up cancelled by shutdown.");
                    return WarmUpOutcome {
                        status: WarmUpStatus::Cancelled,
                        attempts,
                        len: self.len(),
                    };
                }
            }
        }
    }

    /// Calls the source once and merges a successful batch. The caller must
    /// hold `refill_lock`.
    async fn fetch_and_merge(&self, source: &dyn CommentSource) -> RefillOutcome {
        metrics::REFILL_ATTEMPTS_TOTAL.inc();
        let started = Instant::now();
        let result = source.fetch_batch().await;
        metrics::SOURCE_FETCH_SECONDS.observe(started.elapsed().as_secs_f64());

        let batch = match result {
            Ok(batch) if batch.is_empty() => {
                debug!("Comment source '{}' returned an empty batch.", source.name());
                metrics::REFILL_FAILURES_TOTAL.inc();
                return RefillOutcome::NothingFetched;
            }
            Ok(batch) => batch,
            Err(e) => {
                warn!("Comment source '{}' failed: {}", source.name(), e);
                metrics::REFILL_FAILURES_TOTAL.inc();
                return RefillOutcome::Failed;
            }
        };

        let fetched = batch.len();
        let (added, len) = {
            let mut buffer = self.buffer.lock();
            let added = buffer.merge(batch);
            (added, buffer.len())
        };
        metrics::RECORDS_ADDED_TOTAL.inc_by(added as f64);
        metrics::CACHE_SIZE.set(len as f64);

        info!(
            "Merged {} new comments ({} fetched). Cache now holds {}.",
            added, fetched, len
        );
        RefillOutcome::Merged {
            fetched,
            added,
            len,
        }
    }
}
