// src/server/mod.rs

use crate::config::Config;
use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

mod context;
mod initialization;
pub mod metrics_server;
pub mod routes;
mod serve_loop;
mod signals;
mod spawner;

/// The main service startup function, orchestrating all setup phases.
pub async fn run(config: Config) -> Result<()> {
    let mut signals = signals::ShutdownSignals::register()?;

    // 1. Build the cache, the comment source, and the shutdown channel.
    let mut ctx = initialization::setup(config);

    // 2. Fill the cache before any request can be served.
    if !initialization::warm_up(&ctx, &mut signals).await {
        info!("Exiting before serving any requests.");
        return Ok(());
    }

    // 3. Bind only once the cache is warm so early callers are never queued.
    let addr = ctx.config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {addr}"))?;
    info!("Listening on http://{}", addr);

    // 4. Spawn all background tasks.
    spawner::spawn_all(&mut ctx);

    // 5. Serve until shutdown.
    serve_loop::run(ctx, listener, signals).await
}
