//! Report Engine
//!
//! Runs one report request end to end: resolve the period, aggregate counts
//! from the record store, lay out the chart and render the PDF.
//!
//! All fallible work finishes before the caller sees any bytes. Rendering runs
//! on the blocking pool and produces the whole document in memory, so an error
//! at any stage is still reported as a single clean error.

use crate::report::aggregate::{aggregate, Totals};
use crate::report::chart::ChartLayout;
use crate::report::error::{ReportError, ReportResult};
use crate::report::locale::ReportLocale;
use crate::report::period::PeriodSpec;
use crate::report::render::{chart_bounds, render_pdf, ReportDocument};
use crate::store::{EntityKind, RecordStore};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

/// Prefix of every report filename
pub const FILENAME_PREFIX: &str = "hospital-estadisticas";

/// Hospital identity printed on reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportBranding {
    pub hospital_name: String,
    pub footer: String,
}

impl Default for ReportBranding {
    fn default() -> Self {
        Self {
            hospital_name: "HOPE".to_string(),
            footer: "Hospital HOPE - Calle Falsa 123, Ciudad - Tel: +502 1234-5678".to_string(),
        }
    }
}

/// Presentation settings shared by every report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSettings {
    pub locale: ReportLocale,
    pub branding: ReportBranding,
}

/// A finished report
#[derive(Debug, Clone)]
pub struct RenderedReport {
    /// Suggested download name, `hospital-estadisticas-<period label>.pdf`
    pub filename: String,
    pub period_label: String,
    pub totals: Totals,
    /// Complete PDF document
    pub bytes: Vec<u8>,
}

/// Generates statistics reports from a record store
#[derive(Clone)]
pub struct ReportEngine {
    store: Arc<dyn RecordStore>,
    settings: ReportSettings,
}

impl ReportEngine {
    pub fn new(store: Arc<dyn RecordStore>, settings: ReportSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Generate the report for `spec`
    pub async fn generate(&self, spec: PeriodSpec) -> ReportResult<RenderedReport> {
        let started = Instant::now();

        let period = spec.resolve(self.settings.locale)?;
        tracing::info!(
            period = %period.label,
            range = %period.range,
            granularity = %period.granularity,
            buckets = period.bucket_count(),
            "Generating hospital report"
        );

        let series = aggregate(self.store.as_ref(), &period)
            .await
            .inspect_err(|e| tracing::warn!(period = %period.label, error = %e, "Report aggregation failed"))?;
        let totals = series.totals();
        let layout = ChartLayout::compute(chart_bounds(), &series);

        let filename = format!("{}-{}.pdf", FILENAME_PREFIX, period.label);
        let period_label = period.label.clone();

        let document = ReportDocument {
            period,
            series,
            layout,
            settings: self.settings.clone(),
            generated_at: Utc::now(),
        };
        let bytes = tokio::task::spawn_blocking(move || render_pdf(&document))
            .await
            .map_err(|e| ReportError::RenderingFailure(format!("render task failed: {e}")))
            .and_then(|rendered| rendered)
            .inspect_err(|e| tracing::warn!(period = %period_label, error = %e, "Report rendering failed"))?;

        tracing::info!(
            period = %period_label,
            patients = totals.get(EntityKind::Patient),
            appointments = totals.get(EntityKind::Appointment),
            reports = totals.get(EntityKind::Report),
            lab_results = totals.get(EntityKind::LabResult),
            prescriptions = totals.get(EntityKind::Prescription),
            total = totals.grand_total(),
            size_bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Hospital report generated"
        );

        Ok(RenderedReport {
            filename,
            period_label,
            totals,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SqliteStore, StoreError};
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn ts(year: i32, month: u32, day: u32) -> i64 {
        Utc.with_ymd_and_hms(year, month, day, 10, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    async fn seeded_engine() -> (ReportEngine, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("records.db")).unwrap();

        store
            .insert_batch(EntityKind::Patient, vec![ts(2025, 4, 2), ts(2025, 5, 9), ts(2025, 12, 1)])
            .await
            .unwrap();
        store
            .insert_batch(EntityKind::Appointment, vec![ts(2025, 4, 2); 4])
            .await
            .unwrap();
        store
            .insert_batch(EntityKind::LabResult, vec![ts(2024, 6, 30), ts(2025, 6, 30)])
            .await
            .unwrap();
        store
            .insert(EntityKind::Prescription, ts(2025, 2, 14))
            .await
            .unwrap();

        let engine = ReportEngine::new(Arc::new(store), ReportSettings::default());
        (engine, dir)
    }

    #[tokio::test]
    async fn test_generate_year_report() {
        let (engine, _dir) = seeded_engine().await;

        let report = engine.generate(PeriodSpec::year(2025)).await.unwrap();

        assert!(report.bytes.starts_with(b"%PDF"));
        assert_eq!(report.filename, "hospital-estadisticas-Year 2025.pdf");
        assert_eq!(report.period_label, "Year 2025");
        assert_eq!(report.totals, Totals::from([3, 4, 0, 1, 1]));
    }

    #[tokio::test]
    async fn test_generate_quarter_report() {
        let (engine, _dir) = seeded_engine().await;

        let report = engine.generate(PeriodSpec::quarter(2025, 2)).await.unwrap();

        assert_eq!(report.period_label, "Quarter 2 / 2025");
        assert_eq!(report.totals, Totals::from([2, 4, 0, 1, 0]));
    }

    #[tokio::test]
    async fn test_generate_empty_month() {
        let (engine, _dir) = seeded_engine().await;

        let report = engine.generate(PeriodSpec::month(2023, 2)).await.unwrap();

        assert!(report.bytes.starts_with(b"%PDF"));
        assert_eq!(report.totals.grand_total(), 0);
    }

    #[tokio::test]
    async fn test_invalid_period_skips_queries() {
        let dir = tempdir().unwrap();
        // A directory in place of the database file makes every query fail
        let store = SqliteStore::open(dir.path().join("records.db")).unwrap();
        std::fs::remove_file(store.path()).unwrap();
        std::fs::create_dir(store.path()).unwrap();

        let engine = ReportEngine::new(Arc::new(store), ReportSettings::default());

        let err = engine.generate(PeriodSpec::quarter(2025, 5)).await.unwrap_err();
        assert_eq!(err.field(), Some("quarter"));

        let err = engine.generate(PeriodSpec::quarter(2025, 1)).await.unwrap_err();
        assert!(matches!(
            err,
            ReportError::AggregationFailure {
                source: StoreError::Sqlite(_),
                ..
            }
        ));
    }
}
