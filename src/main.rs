//! Stride CLI entry point.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stride::adapters::http::{ApiServer, AppState};
use stride::adapters::sqlite::{initialize_database, PoolConfig};
use stride::domain::models::{Config, LoggingConfig};
use stride::domain::ports::SystemClock;
use stride::infrastructure::config::ConfigLoader;

#[derive(Parser)]
#[command(name = "stride")]
#[command(about = "Stride - Goal Tracking REST Backend", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a configuration file (overrides the .stride/ hierarchy)
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations and start the HTTP API server
    Serve,

    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    init_tracing(&config.logging);

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Migrate => migrate(&config).await,
    }
}

fn init_tracing(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false);

    if config.format == "json" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting stride API server");
    info!("Database path: {}", config.database.path);

    let database_url = format!("sqlite:{}", config.database.path);
    let pool = initialize_database(&database_url, Some(PoolConfig::from(&config.database)))
        .await
        .context("Failed to initialize database")?;

    let state = AppState::new(pool, Arc::new(SystemClock));

    ApiServer::new(state, config.server)
        .serve_with_shutdown(shutdown_signal())
        .await
        .map_err(|err| anyhow::anyhow!(err))
}

async fn migrate(config: &Config) -> Result<()> {
    info!("Running database migrations");

    let database_url = format!("sqlite:{}", config.database.path);
    initialize_database(&database_url, Some(PoolConfig::from(&config.database)))
        .await
        .context("Failed to run database migrations")?;

    info!("Database schema is up to date");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    info!("Shutdown signal received, stopping server");
}
