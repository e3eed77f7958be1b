//! HOPE Statistics Report
//!
//! Builds the hospital's period report:
//!
//! - **period**: Resolve year/quarter/month requests into date ranges and buckets
//! - **aggregate**: Concurrent grouped counts folded into dense series
//! - **chart**: Bar-chart geometry
//! - **render**: PDF output
//! - **locale**: Report wording (English, Spanish)
//! - **engine**: Orchestrates one report request
//! - **error**: Error types
//!
//! # Pipeline
//!
//! ```text
//!   PeriodSpec → resolve → ResolvedPeriod ─┬→ aggregate (5 queries) → SeriesSet
//!                                          │                            │
//!                                          │                  ChartLayout::compute
//!                                          │                            │
//!                                          └──────────→ render_pdf ←────┘ → PDF bytes
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use hope::report::{PeriodSpec, ReportEngine, ReportSettings};
//! use hope::store::SqliteStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::open("./hope_data/records.db")?);
//!     let engine = ReportEngine::new(store, ReportSettings::default());
//!
//!     let report = engine.generate(PeriodSpec::quarter(2025, 2)).await?;
//!     std::fs::write(&report.filename, &report.bytes)?;
//!
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod chart;
pub mod engine;
pub mod error;
pub mod locale;
pub mod period;
pub mod render;

pub use aggregate::{aggregate, SeriesCounts, SeriesSet, Totals};
pub use chart::{BarRect, ChartBounds, ChartLayout, LabelAnchor, LegendSwatch, RgbColor, PALETTE};
pub use engine::{RenderedReport, ReportBranding, ReportEngine, ReportSettings, FILENAME_PREFIX};
pub use error::{ReportError, ReportResult};
pub use locale::ReportLocale;
pub use period::{BucketSet, PeriodMode, PeriodSpec, ResolvedPeriod};
pub use render::{render_pdf, ReportDocument};
