// src/server/serve_loop.rs

//! Contains the main serving loop and graceful shutdown handling.

use super::context::ServerContext;
use super::routes;
use super::signals::ShutdownSignals;
use anyhow::{Result, anyhow};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Serves HTTP until a termination signal, a failed background task, or a
/// failed HTTP server ends the loop, then shuts everything down.
pub async fn run(
    mut ctx: ServerContext,
    listener: TcpListener,
    mut signals: ShutdownSignals,
) -> Result<()> {
    let app = routes::router(ctx.cache.clone());
    let mut http_shutdown_rx = ctx.shutdown_tx.subscribe();
    let mut http_server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                http_shutdown_rx.recv().await.ok();
                info!("HTTP server no longer accepting requests.");
            })
            .await
    });

    let mut http_finished = false;
    let mut failure = None;

    loop {
        tokio::select! {
            biased;

            _ = signals.recv() => break,

            Some(res) = ctx.background_tasks.join_next() => {
                match res {
                    Ok(Ok(())) => warn!("A background task finished unexpectedly without an error."),
                    Ok(Err(e)) => {
                        error!("CRITICAL: Background task failed: {}. Shutting down.", e);
                        failure = Some(e);
                        break;
                    }
                    Err(e) => {
                        error!("CRITICAL: Background task panicked: {e:?}. Shutting down.");
                        failure = Some(anyhow!("background task panicked: {e}"));
                        break;
                    }
                }
            },

            res = &mut http_server => {
                http_finished = true;
                let err = match res {
                    Ok(Ok(())) => anyhow!("HTTP server stopped unexpectedly"),
                    Ok(Err(e)) => anyhow!("HTTP server failed: {e}"),
                    Err(e) => anyhow!("HTTP server task panicked: {e}"),
                };
                error!("CRITICAL: {}. Shutting down.", err);
                failure = Some(err);
                break;
            }
        }
    }

    info!("Shutting down. Sending signal to all tasks.");
    if ctx.shutdown_tx.send(()).is_err() {
        error!("Failed to send shutdown signal. Some tasks may not terminate gracefully.");
    }

    if !http_finished {
        match tokio::time::timeout(Duration::from_secs(10), http_server).await {
            Ok(Ok(Ok(()))) => info!("HTTP server stopped."),
            Ok(Ok(Err(e))) => error!("HTTP server finished with error: {}", e),
            Ok(Err(e)) => error!("HTTP server task panicked: {e:?}"),
            Err(_) => warn!("Timed out waiting for in-flight HTTP requests to finish."),
        }
    }

    info!("Waiting for background tasks to finish...");
    if tokio::time::timeout(Duration::from_secs(10), async {
        while ctx.background_tasks.join_next().await.is_some() {}
    })
    .await
    .is_err()
    {
        warn!("Timed out waiting for background tasks to finish cleanly.");
    };
    info!("Service shutdown complete.");

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
