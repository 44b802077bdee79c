// Main entrypoint for the leasekeeper demo.

use anyhow::{Context, Result};
use clap::Parser;
use leasekeeper::app::App;
use leasekeeper::config::{Config, ConfigTrait};
use leasekeeper::shutdown::GracefulShutdown;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const CONFIG_PATH: &str = "cfg/leasekeeper.cfg.yaml";
const CONFIG_PATH_LOCAL: &str = "cfg/leasekeeper.cfg.local.yaml";

/// leasekeeper - shares one time-bounded background grant between many tasks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, value_name = "FILE")]
    cfg: Option<PathBuf>,
}

/// Loads the configuration struct from YAML file.
/// Tries local config first, then falls back to default config.
fn load_cfg(path: Option<PathBuf>) -> Result<Config> {
    if let Some(custom_path) = path {
        return Config::load(&custom_path)
            .with_context(|| format!("failed to load custom config from {:?}", custom_path));
    }

    match Config::load(CONFIG_PATH_LOCAL) {
        Ok(cfg) => Ok(cfg),
        Err(_) => Config::load(CONFIG_PATH)
            .with_context(|| format!("failed to load config from {}", CONFIG_PATH)),
    }
}

/// Configures structured logging based on configuration.
fn configure_logger(cfg: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let log_level = cfg
        .logs()
        .and_then(|logs| logs.level.as_ref())
        .map(|s| s.as_str())
        .unwrap_or("debug");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if cfg.is_prod() {
        // Production: JSON format
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        // Development: Pretty console format
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tokio::runtime::Runtime::new()
        .context("Failed to create tokio runtime")?
        .block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    let cfg = load_cfg(args.cfg)?;

    // Configure logger (must be done after config is loaded)
    configure_logger(&cfg);
    info!(
        component = "config",
        event = "load_success",
        env = %cfg.leasekeeper.env,
        "config loaded"
    );

    let shutdown_token = CancellationToken::new();
    let app = App::new(shutdown_token.clone(), cfg.clone())?;
    let graceful_shutdown = GracefulShutdown::new(
        shutdown_token.clone(),
        app.coordinator().clone(),
        cfg.shutdown().timeout,
    );

    app.serve();

    // Run the demo in the background; finishing it triggers shutdown.
    let demo_app = app.clone();
    tokio::task::spawn(async move {
        let report = demo_app.run_demo().await;
        info!(
            component = "main",
            event = "demo_finished",
            completed = report.completed,
            cancelled = report.cancelled,
            refused = report.refused,
            "all deferred actions finished"
        );
        demo_app.close();
    });

    // Listen for OS signals or cancellation and wait for graceful shutdown
    if let Err(e) = graceful_shutdown.await_shutdown().await {
        error!(
            component = "main",
            scope = "service",
            event = "graceful_shutdown_failed",
            error = %e,
            "failed to gracefully shut down service"
        );
        return Err(e);
    }

    Ok(())
}
