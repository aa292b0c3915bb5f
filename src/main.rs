//! Driver KPI service.
//!
//! Serves `GET /kpi?driver_id=<id>&year=<year>` from the `driverkpi` table.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ http (axum, request id, trace) ──▶ handlers ──▶ KpiStore
//!                                                                │
//!                                                                ▼
//!   Client ◀── JSON (200 / 400 / 404 / 500) ◀──────────── ConnectionPool ──▶ MySQL
//! ```
//!
//! # Startup
//! - `.env` (if present), then config file (`--config`), then environment
//! - The pool connects once; if the store is down the service still starts
//!   and every KPI request answers 500

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use driver_kpi::config::{load_config, validate_config, ConfigError, ServiceConfig};
use driver_kpi::db::{ConnectionPool, MySqlKpiStore};
use driver_kpi::http::HttpServer;
use driver_kpi::lifecycle::{wait_for_signal, Shutdown};
use driver_kpi::observability::init_logging;

#[derive(Parser)]
#[command(name = "driver-kpi")]
#[command(about = "Read-only HTTP service for monthly driver KPIs", long_about = None)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn load(cli: &Cli) -> Result<ServiceConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    config.apply_env()?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Local development only; deployments set real environment variables.
    let _ = dotenvy::dotenv();

    let config = load(&cli)?;
    init_logging(&config.observability.log_level);

    tracing::info!("driver-kpi v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        database = ?config.database,
        "Configuration loaded"
    );

    let pool = ConnectionPool::connect(&config.database).await;
    let store = Arc::new(MySqlKpiStore::new(pool.clone()));

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, store);
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut server_task => result??,
        _ = wait_for_signal() => {
            shutdown.trigger();
            server_task.await??;
        }
    }
    pool.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
