// src/server/initialization.rs

//! Handles service initialization: state setup and the blocking cache
//! warm-up that must finish before any request is served.

use super::context::ServerContext;
use super::signals::ShutdownSignals;
use crate::config::Config;
use crate::core::CommentCache;
use crate::core::cache::WarmUpStatus;
use crate::core::source;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Builds the cache, the comment source, and the shutdown channel.
pub fn setup(config: Config) -> ServerContext {
    log_startup_info(&config);
    let (shutdown_tx, _) = broadcast::channel(1);

    let cache = Arc::new(CommentCache::new(config.cache.target_size));
    let source = source::build_source(&config.source);
    info!("Comment cache initialized (target size {}).", cache.target_size());

    ServerContext {
        config,
        cache,
        source,
        shutdown_tx,
        background_tasks: JoinSet::new(),
    }
}

/// Runs the startup warm-up. Returns `false` when a termination signal
/// arrived first and the service should exit without serving.
pub async fn warm_up(ctx: &ServerContext, signals: &mut ShutdownSignals) -> bool {
    if !ctx.source.is_enabled() {
        warn!("Comment source is disabled. Skipping warm-up; every read will report an empty cache.");
        return true;
    }

    let options = ctx.config.cache.warm_up_options();
    info!(
        "Filling the initial cache to {} comments before accepting traffic...",
        options.min_size
    );

    let mut warmup_shutdown_rx = ctx.shutdown_tx.subscribe();
    let outcome = tokio::select! {
        outcome = ctx.cache.warm_up(ctx.source.as_ref(), options, &mut warmup_shutdown_rx) => outcome,
        _ = signals.recv() => {
            info!("Shutdown requested during warm-up.");
            return false;
        }
    };

    match outcome.status {
        WarmUpStatus::Ready => {
            info!(
                "Initial cache ready with {} comments after {} attempts.",
                outcome.len, outcome.attempts
            );
            true
        }
        WarmUpStatus::AttemptsExhausted => {
            warn!(
                "Starting with a partially filled cache ({} comments). The refill task will keep trying.",
                outcome.len
            );
            true
        }
        WarmUpStatus::Cancelled => false,
    }
}

fn log_startup_info(config: &Config) {
    info!(
        "comment-roulette {} starting on {}",
        env!("CARGO_PKG_VERSION"),
        config.listen_addr()
    );
    info!(
        "Refill every {:?}, warm-up to {} comments every {:?}.",
        config.cache.refill_interval,
        config.cache.resolved_warmup_min_size(),
        config.cache.warmup_interval
    );
}
