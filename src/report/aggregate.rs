//! Bucket Aggregator
//!
//! Counts each tracked entity kind over a resolved period and spreads the
//! counts into dense per-bucket series.
//!
//! ```text
//!   ResolvedPeriod ──┬─> grouped_counts(Patient)      ─┐
//!                    ├─> grouped_counts(Appointment)  ─┤
//!                    ├─> grouped_counts(Report)       ─┼─> join all ─> fold ─> SeriesSet
//!                    ├─> grouped_counts(LabResult)    ─┤
//!                    └─> grouped_counts(Prescription) ─┘
//! ```
//!
//! The five queries run concurrently. The join is all-or-nothing: the first
//! failure aborts the report and no partial series are produced.

use crate::report::error::{ReportError, ReportResult};
use crate::report::period::ResolvedPeriod;
use crate::store::{EntityKind, GroupedCount, RecordStore};
use futures_util::future::try_join_all;

/// Per-bucket counts for one entity kind, index-aligned with the period's buckets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesCounts {
    pub kind: EntityKind,
    counts: Vec<u64>,
}

impl SeriesCounts {
    /// A series of `len` zero buckets
    pub fn zeroed(kind: EntityKind, len: usize) -> Self {
        Self {
            kind,
            counts: vec![0; len],
        }
    }

    /// Write grouped rows into their buckets
    ///
    /// Each row overwrites its bucket, so folding the same result twice leaves
    /// the series unchanged. Rows whose bucket id falls outside the period are
    /// skipped; the number skipped is returned.
    pub fn fold(&mut self, rows: &[GroupedCount], period: &ResolvedPeriod) -> usize {
        let mut discarded = 0;

        for row in rows {
            match period.bucket_index(row.bucket_id) {
                Some(index) if index < self.counts.len() => self.counts[index] = row.count,
                _ => {
                    tracing::debug!(
                        kind = %self.kind,
                        bucket_id = row.bucket_id,
                        period = %period.label,
                        "Discarding grouped count outside the period"
                    );
                    discarded += 1;
                }
            }
        }

        discarded
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum over all buckets
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Largest bucket, 0 for an empty series
    pub fn max(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Period totals per entity kind, in series order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Totals {
    values: [u64; 5],
}

impl Totals {
    pub fn get(&self, kind: EntityKind) -> u64 {
        self.values[kind.series_index()]
    }

    /// `(kind, total)` pairs in series order
    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, u64)> + '_ {
        EntityKind::ALL.iter().map(move |kind| (*kind, self.get(*kind)))
    }

    /// Sum across all kinds
    pub fn grand_total(&self) -> u64 {
        self.values.iter().sum()
    }
}

impl From<[u64; 5]> for Totals {
    fn from(values: [u64; 5]) -> Self {
        Self { values }
    }
}

/// The five series of a report, one per [`EntityKind`], in series order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSet {
    series: Vec<SeriesCounts>,
    bucket_count: usize,
}

impl SeriesSet {
    /// All-zero series for `bucket_count` buckets
    pub fn zeroed(bucket_count: usize) -> Self {
        Self {
            series: EntityKind::ALL
                .iter()
                .map(|kind| SeriesCounts::zeroed(*kind, bucket_count))
                .collect(),
            bucket_count,
        }
    }

    /// Fold grouped rows for `kind` into its series; returns the number discarded
    pub fn fold(&mut self, kind: EntityKind, rows: &[GroupedCount], period: &ResolvedPeriod) -> usize {
        self.series[kind.series_index()].fold(rows, period)
    }

    pub fn get(&self, kind: EntityKind) -> &SeriesCounts {
        &self.series[kind.series_index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesCounts> {
        self.series.iter()
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Largest count across every series and bucket
    pub fn max_count(&self) -> u64 {
        self.series.iter().map(SeriesCounts::max).max().unwrap_or(0)
    }

    pub fn totals(&self) -> Totals {
        let mut values = [0; 5];
        for series in &self.series {
            values[series.kind.series_index()] = series.total();
        }
        Totals::from(values)
    }
}

/// Query the store for every entity kind concurrently and fold the results
pub async fn aggregate(store: &dyn RecordStore, period: &ResolvedPeriod) -> ReportResult<SeriesSet> {
    let queries = EntityKind::ALL.iter().map(|kind| async move {
        store
            .grouped_counts(*kind, period.range, period.granularity)
            .await
            .map(|rows| (*kind, rows))
            .map_err(|source| ReportError::AggregationFailure {
                kind: *kind,
                source,
            })
    });

    let results = try_join_all(queries).await?;

    let mut series = SeriesSet::zeroed(period.bucket_count());
    for (kind, rows) in &results {
        let discarded = series.fold(*kind, rows, period);
        if discarded > 0 {
            tracing::warn!(
                kind = %kind,
                discarded,
                period = %period.label,
                "Grouped counts fell outside the requested period"
            );
        }
    }

    Ok(series)
}
