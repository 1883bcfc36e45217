// src/bin/serve.rs

//! # Serve Binary
//!
//! Loads the tweet dataset once at startup and serves the dashboard panels as
//! JSON over HTTP. A load failure aborts startup; bad query parameters only
//! affect the panel they were meant for.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use SentimentBoard::config::cli::ServeArgs;
use SentimentBoard::config::{load_dashboard_config, DashboardConfig};
use SentimentBoard::executor::DashboardContext;
use SentimentBoard::pipeline::loader::DatasetLoader;
use SentimentBoard::server::{run_server, spawn_metrics_server};
use SentimentBoard::utils::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServeArgs::parse();

    let mut config = match &args.config {
        Some(path) => load_dashboard_config(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    if let Some(input) = &args.input_file {
        config.input.path = input.clone();
    }
    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if args.metrics_port.is_some() {
        config.server.metrics_port = args.metrics_port;
    }
    config.validate().context("validating config")?;
    if args.validate_config {
        println!("Configuration is valid.");
        return Ok(());
    }

    let _guard = init_tracing(
        args.json_logs || config.logging.json,
        config.logging.directory.as_deref().map(std::path::Path::new),
        "serve.log",
    );

    info!("Dashboard server starting.");
    info!("Input file: {}", config.input.path);
    info!("Bind address: {}", config.server.bind);

    // Loading is blocking file I/O; keep it off the async workers
    let input = config.input.clone();
    let dataset = tokio::task::spawn_blocking(move || DatasetLoader::new().load(&input))
        .await
        .context("dataset loader task panicked")?
        .map_err(|e| {
            error!("Failed to load dataset: {}", e);
            e
        })
        .with_context(|| format!("loading {}", config.input.path))?;

    let ctx = Arc::new(DashboardContext::new(dataset, &config));
    spawn_metrics_server(config.server.metrics_port);
    run_server(ctx, &config.server.bind).await?;
    Ok(())
}
