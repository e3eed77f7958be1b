//! # HOPE
//!
//! Statistical report service for the HOPE hospital backend. Counts how many
//! patients, appointments, reports, lab results and prescriptions were created
//! over a year, a quarter or a month and renders them as a one-page PDF with a
//! grouped bar chart.
//!
//! ## Modules
//!
//! - [`store`]: Record store trait and its SQLite implementation
//! - [`report`]: Period resolution, aggregation, chart layout, PDF rendering
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hope::{PeriodSpec, ReportEngine, ReportSettings, SqliteStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::open("./hope_data/records.db")?);
//!     let engine = ReportEngine::new(store, ReportSettings::default());
//!
//!     let report = engine.generate(PeriodSpec::month(2025, 2)).await?;
//!     println!("{}: {} bytes", report.filename, report.bytes.len());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod report;
pub mod store;

// Re-export top-level types for convenience
pub use store::{
    DateRange, EntityKind, Granularity, GroupedCount, RecordStore, SqliteStore, StoreError,
    StoreResult,
};

pub use report::{
    PeriodMode, PeriodSpec, RenderedReport, ReportEngine, ReportError, ReportLocale,
    ReportResult, ReportSettings, ResolvedPeriod, SeriesSet, Totals,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{
    ApiConfig, Config, ConfigError, ConfigSource, LoggingConfig, ReportConfig, StorageConfig,
};
