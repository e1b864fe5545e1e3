// src/server/spawner.rs

//! Spawns all of the service's long-running background tasks.

use super::context::ServerContext;
use super::metrics_server;
use crate::core::tasks::refill::RefillTask;
use tracing::info;

/// Spawns all background tasks into the context's JoinSet.
pub fn spawn_all(ctx: &mut ServerContext) {
    let shutdown_tx = &ctx.shutdown_tx;
    let background_tasks = &mut ctx.background_tasks;

    // --- Metrics Server ---
    if ctx.config.metrics.enabled {
        let metrics_cache = ctx.cache.clone();
        let metrics_addr = format!("{}:{}", ctx.config.host, ctx.config.metrics.port);
        let shutdown_rx_metrics = shutdown_tx.subscribe();
        background_tasks.spawn(async move {
            metrics_server::run_metrics_server(metrics_cache, metrics_addr, shutdown_rx_metrics)
                .await
        });
    } else {
        info!("Prometheus metrics server is disabled in the configuration.");
    }

    // --- Cache Refill ---
    let refill_task = RefillTask::new(
        ctx.cache.clone(),
        ctx.source.clone(),
        ctx.config.cache.refill_interval,
    );
    let shutdown_rx_refill = shutdown_tx.subscribe();
    background_tasks.spawn(async move {
        refill_task.run(shutdown_rx_refill).await;
        Ok(())
    });

    info!("All background tasks have been spawned.");
}
