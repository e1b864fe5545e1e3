// src/main.rs

//! The main entry point for the comment-roulette service.

use anyhow::Result;
use comment_roulette::config::{Config, ConfigOrigin};
use comment_roulette::server;
use std::env;
use tracing::{error, warn};
use tracing_subscriber::{filter::EnvFilter, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let args: Vec<String> = env::args().collect();

    if args.contains(&"--version".to_string()) {
        println!("comment-roulette version {VERSION}");
        return Ok(());
    }

    // An explicit --config must exist; the default path may be absent.
    let explicit_config = args
        .iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    const DEFAULT_CONFIG_PATH: &str = "config.toml";
    let loaded = match explicit_config {
        Some(path) => Config::from_file(path)
            .map(|cfg| (cfg, ConfigOrigin::File))
            .map_err(|e| (path, e)),
        None => Config::from_file_or_default(DEFAULT_CONFIG_PATH)
            .map_err(|e| (DEFAULT_CONFIG_PATH, e)),
    };
    let (mut config, origin) = match loaded {
        Ok(loaded) => loaded,
        Err((path, e)) => {
            eprintln!("Failed to load configuration from \"{path}\": {e:#}");
            std::process::exit(1);
        }
    };

    if let Some(port_index) = args.iter().position(|arg| arg == "--port") {
        if let Some(port_str) = args.get(port_index + 1) {
            let port = match port_str.parse::<u16>() {
                Ok(port) if port != 0 => port,
                _ => {
                    eprintln!("Invalid port number: {port_str}");
                    std::process::exit(1);
                }
            };
            config = match config.with_port(port) {
                Ok(cfg) => cfg,
                Err(e) => {
                    eprintln!("Invalid configuration after applying --port: {e:#}");
                    std::process::exit(1);
                }
            };
        } else {
            eprintln!("--port flag requires a value");
            std::process::exit(1);
        }
    }

    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    tracing_subscriber::registry()
        .with(EnvFilter::new(log_level))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true),
        )
        .init();

    if origin == ConfigOrigin::Defaults {
        warn!(
            "Config file '{}' not found. Using built-in defaults.",
            DEFAULT_CONFIG_PATH
        );
    }

    if let Err(e) = server::run(config).await {
        error!("Server runtime error: {}", e);
        return Err(e);
    }

    Ok(())
}
