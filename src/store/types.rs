//! Core data types shared by the record store and the report engine
//!
//! - `EntityKind`: The five record collections tracked by hospital reports
//! - `DateRange`: A half-open UTC interval over record creation timestamps
//! - `Granularity`: Calendar field that grouped counts are keyed by
//! - `GroupedCount`: One row of a grouped-count query

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Record collections counted by the statistics report
///
/// The declaration order is the series order used everywhere in a report:
/// totals list, chart bars, palette and legend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Newly registered patients
    Patient,
    /// Scheduled appointments
    Appointment,
    /// Clinical reports
    Report,
    /// Laboratory results
    LabResult,
    /// Issued prescriptions
    Prescription,
}

impl EntityKind {
    /// All kinds, in series order
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Patient,
        EntityKind::Appointment,
        EntityKind::Report,
        EntityKind::LabResult,
        EntityKind::Prescription,
    ];

    /// Stable key used in the `records.kind` column
    pub fn storage_key(&self) -> &'static str {
        match self {
            EntityKind::Patient => "patient",
            EntityKind::Appointment => "appointment",
            EntityKind::Report => "report",
            EntityKind::LabResult => "result",
            EntityKind::Prescription => "prescription",
        }
    }

    /// Position of this kind in [`EntityKind::ALL`]
    pub fn series_index(&self) -> usize {
        match self {
            EntityKind::Patient => 0,
            EntityKind::Appointment => 1,
            EntityKind::Report => 2,
            EntityKind::LabResult => 3,
            EntityKind::Prescription => 4,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}

/// Calendar field extracted from a record's creation timestamp for grouping
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Calendar month number, 1..=12
    MonthOfYear,
    /// Calendar day of month, 1..=31
    DayOfMonth,
}

impl Granularity {
    /// SQLite `strftime` format extracting this field
    pub fn strftime_format(&self) -> &'static str {
        match self {
            Granularity::MonthOfYear => "%m",
            Granularity::DayOfMonth => "%d",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::MonthOfYear => write!(f, "month"),
            Granularity::DayOfMonth => write!(f, "day"),
        }
    }
}

/// Date range over record creation time (half-open interval: [start, end))
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Start timestamp (inclusive), in milliseconds
    pub start: i64,
    /// End timestamp (exclusive), in milliseconds
    pub end: i64,
}

impl DateRange {
    /// Create a range, returning None if start >= end
    pub fn try_new(start: i64, end: i64) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Range from midnight UTC of `start` to midnight UTC of `end`
    pub fn between_dates(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        let start = Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0)?);
        let end = Utc.from_utc_datetime(&end.and_hms_opt(0, 0, 0)?);
        Self::try_new(start.timestamp_millis(), end.timestamp_millis())
    }

    /// Inclusive start as a UTC datetime
    pub fn start_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.start).single()
    }

    /// Exclusive end as a UTC datetime
    pub fn end_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.end).single()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.start_utc(), self.end_utc()) {
            (Some(start), Some(end)) => write!(
                f,
                "[{}, {})",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
            _ => write!(f, "[{}, {})", self.start, self.end),
        }
    }
}

/// One row of a grouped-count query: records whose creation timestamp
/// falls in bucket `bucket_id` of the requested granularity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupedCount {
    pub bucket_id: i64,
    pub count: u64,
}

impl GroupedCount {
    pub fn new(bucket_id: i64, count: u64) -> Self {
        Self { bucket_id, count }
    }
}
