// src/server/signals.rs

use anyhow::{Result, anyhow};
use tokio::signal::unix::{Signal, SignalKind, signal};
use tracing::info;

/// The process termination signals the service reacts to.
pub struct ShutdownSignals {
    sigint: Signal,
    sigterm: Signal,
}

impl ShutdownSignals {
    pub fn register() -> Result<Self> {
        let sigint = signal(SignalKind::interrupt())
            .map_err(|e| anyhow!("Failed to register SIGINT handler: {}", e))?;
        let sigterm = signal(SignalKind::terminate())
            .map_err(|e| anyhow!("Failed to register SIGTERM handler: {}", e))?;
        Ok(Self { sigint, sigterm })
    }

    /// Resolves when either SIGINT or SIGTERM arrives.
    pub async fn recv(&mut self) {
        tokio::select! {
            _ = self.sigint.recv() => info!("SIGINT received, initiating graceful shutdown."),
            _ = self.sigterm.recv() => info!("SIGTERM received, initiating graceful shutdown."),
        }
    }
}
