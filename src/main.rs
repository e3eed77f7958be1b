//! HOPE Report Server
//!
//! Run with: cargo run --bin hope
//!
//! Configuration is read from `config.toml` (see `hope-cli config`) and the
//! `HOPE_*` environment variables. `RUST_LOG` overrides the configured level.

use anyhow::Context;
use hope::api::{serve, AppState};
use hope::config::Config;
use hope::report::ReportEngine;
use hope::store::SqliteStore;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, source) = Config::load_default();
    config.logging.init();
    source.log();

    tracing::info!("Starting HOPE report server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Database: {}", config.storage.database_path);
    tracing::info!(
        locale = %config.report.locale,
        hospital = %config.report.hospital_name,
        "Report settings"
    );

    let store = SqliteStore::open(&config.storage.database_path)
        .with_context(|| format!("opening record store at {}", config.storage.database_path))?;
    let engine = ReportEngine::new(Arc::new(store), config.report.settings());

    let state = AppState::new(engine, config.api.clone());
    serve(state, &config.api).await.context("API server failed")?;

    tracing::info!("HOPE report server shutdown complete");
    Ok(())
}
