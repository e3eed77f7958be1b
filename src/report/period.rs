//! Period Resolver
//!
//! Turns a requested period (a whole year, one quarter, or one month) into the
//! concrete UTC date range to count over, the ordered bucket labels the counts
//! are spread across, and the calendar field the store groups by.
//!
//! | Mode    | Range                              | Buckets            | Grouped by   |
//! |---------|------------------------------------|--------------------|--------------|
//! | Year    | Jan 1 .. Jan 1 of next year        | 12 months          | month        |
//! | Quarter | 1st of first month .. +3 months    | 3 months           | month        |
//! | Month   | 1st of month .. 1st of next month  | 1..days-in-month   | day of month |

use crate::report::error::{ReportError, ReportResult};
use crate::report::locale::ReportLocale;
use crate::store::{DateRange, Granularity};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of period a report covers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PeriodMode {
    Year,
    Quarter,
    Month,
}

impl FromStr for PeriodMode {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "year" => Ok(PeriodMode::Year),
            "quarter" => Ok(PeriodMode::Quarter),
            "month" => Ok(PeriodMode::Month),
            _ => Err(ReportError::invalid(
                "type",
                "Invalid 'type' parameter. Must be 'year', 'quarter' or 'month'.",
            )),
        }
    }
}

impl std::fmt::Display for PeriodMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeriodMode::Year => write!(f, "year"),
            PeriodMode::Quarter => write!(f, "quarter"),
            PeriodMode::Month => write!(f, "month"),
        }
    }
}

/// A requested report period, as received from the caller
///
/// `quarter` is only consulted in quarter mode and `month` only in month mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeriodSpec {
    pub mode: PeriodMode,
    pub year: i32,
    #[serde(default)]
    pub quarter: Option<u32>,
    #[serde(default)]
    pub month: Option<u32>,
}

impl PeriodSpec {
    /// A whole calendar year
    pub fn year(year: i32) -> Self {
        Self {
            mode: PeriodMode::Year,
            year,
            quarter: None,
            month: None,
        }
    }

    /// One quarter (1..=4) of a year
    pub fn quarter(year: i32, quarter: u32) -> Self {
        Self {
            mode: PeriodMode::Quarter,
            year,
            quarter: Some(quarter),
            month: None,
        }
    }

    /// One month (1..=12) of a year
    pub fn month(year: i32, month: u32) -> Self {
        Self {
            mode: PeriodMode::Month,
            year,
            quarter: None,
            month: Some(month),
        }
    }

    /// Resolve into a date range, bucket set and grouping granularity
    pub fn resolve(&self, locale: ReportLocale) -> ReportResult<ResolvedPeriod> {
        let months = locale.month_abbrevs();

        match self.mode {
            PeriodMode::Year => {
                let range = date_range(self.year, 1, next_year(self.year)?, 1)?;
                Ok(ResolvedPeriod {
                    spec: *self,
                    range,
                    buckets: BucketSet::new(months.iter().map(|m| m.to_string()).collect()),
                    label: locale.year_label(self.year),
                    granularity: Granularity::MonthOfYear,
                    first_bucket_id: 1,
                })
            }
            PeriodMode::Quarter => {
                let quarter = self.quarter.filter(|q| (1..=4).contains(q)).ok_or_else(|| {
                    ReportError::invalid(
                        "quarter",
                        "When type='quarter', quarter must be provided as 1..4.",
                    )
                })?;

                // 0-indexed month the quarter starts on
                let start_month = (quarter - 1) * 3;
                let (end_year, end_month) = if start_month + 3 >= 12 {
                    (next_year(self.year)?, 1)
                } else {
                    (self.year, start_month + 4)
                };
                let range = date_range(self.year, start_month + 1, end_year, end_month)?;
                let labels = months[start_month as usize..start_month as usize + 3]
                    .iter()
                    .map(|m| m.to_string())
                    .collect();

                Ok(ResolvedPeriod {
                    spec: *self,
                    range,
                    buckets: BucketSet::new(labels),
                    label: locale.quarter_label(quarter, self.year),
                    granularity: Granularity::MonthOfYear,
                    first_bucket_id: i64::from(start_month) + 1,
                })
            }
            PeriodMode::Month => {
                let month = self.month.filter(|m| (1..=12).contains(m)).ok_or_else(|| {
                    ReportError::invalid(
                        "month",
                        "When type='month', month must be provided as 1..12.",
                    )
                })?;

                let (end_year, end_month) = if month == 12 {
                    (next_year(self.year)?, 1)
                } else {
                    (self.year, month + 1)
                };
                let first = first_of_month(self.year, month)?;
                let next = first_of_month(end_year, end_month)?;
                let days = next.signed_duration_since(first).num_days();
                let range = DateRange::between_dates(first, next).ok_or_else(invalid_year)?;

                Ok(ResolvedPeriod {
                    spec: *self,
                    range,
                    buckets: BucketSet::new((1..=days).map(|d| d.to_string()).collect()),
                    label: locale.month_label(month, self.year),
                    granularity: Granularity::DayOfMonth,
                    first_bucket_id: 1,
                })
            }
        }
    }
}

fn invalid_year() -> ReportError {
    ReportError::invalid("year", "year is outside the supported calendar range.")
}

fn next_year(year: i32) -> ReportResult<i32> {
    year.checked_add(1).ok_or_else(invalid_year)
}

fn first_of_month(year: i32, month: u32) -> ReportResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid_year)
}

fn date_range(
    start_year: i32,
    start_month: u32,
    end_year: i32,
    end_month: u32,
) -> ReportResult<DateRange> {
    let start = first_of_month(start_year, start_month)?;
    let end = first_of_month(end_year, end_month)?;
    DateRange::between_dates(start, end).ok_or_else(invalid_year)
}

/// Ordered bucket labels; its length is the size of every count series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSet {
    labels: Vec<String>,
}

impl BucketSet {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// A period resolved against the calendar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPeriod {
    /// The request this was resolved from
    pub spec: PeriodSpec,
    /// Creation-time window to count over
    pub range: DateRange,
    pub buckets: BucketSet,
    /// Human-readable period, for display and filenames
    pub label: String,
    pub granularity: Granularity,
    /// Grouped bucket id that lands at index 0
    first_bucket_id: i64,
}

impl ResolvedPeriod {
    /// Number of buckets every series has
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Map a grouped bucket id (month 1..12 or day 1..31) to its series index
    ///
    /// Ids that fall outside this period's buckets return `None`.
    pub fn bucket_index(&self, bucket_id: i64) -> Option<usize> {
        let index = bucket_id.checked_sub(self.first_bucket_id)?;
        usize::try_from(index)
            .ok()
            .filter(|i| *i < self.bucket_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn midnight(year: i32, month: u32, day: u32) -> i64 {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn test_year_resolves_twelve_months() {
        for year in [1999, 2024, 2025] {
            let period = PeriodSpec::year(year).resolve(ReportLocale::En).unwrap();

            assert_eq!(period.bucket_count(), 12);
            assert_eq!(
                period.buckets.labels(),
                &["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"]
            );
            assert_eq!(period.range.start, midnight(year, 1, 1));
            assert_eq!(period.range.end, midnight(year + 1, 1, 1));
            assert_eq!(period.granularity, Granularity::MonthOfYear);
            assert_eq!(period.label, format!("Year {}", year));
        }
    }

    #[test]
    fn test_second_quarter_2025() {
        let period = PeriodSpec::quarter(2025, 2).resolve(ReportLocale::En).unwrap();

        assert_eq!(period.range.start, midnight(2025, 4, 1));
        assert_eq!(period.range.end, midnight(2025, 7, 1));
        assert_eq!(period.buckets.labels(), &["Apr", "May", "Jun"]);
        assert_eq!(period.granularity, Granularity::MonthOfYear);
        assert_eq!(period.label, "Quarter 2 / 2025");
    }

    #[test]
    fn test_fourth_quarter_crosses_year() {
        let period = PeriodSpec::quarter(2025, 4).resolve(ReportLocale::En).unwrap();

        assert_eq!(period.range.start, midnight(2025, 10, 1));
        assert_eq!(period.range.end, midnight(2026, 1, 1));
        assert_eq!(period.buckets.labels(), &["Oct", "Nov", "Dec"]);
    }

    #[test]
    fn test_february_leap_year() {
        let leap = PeriodSpec::month(2024, 2).resolve(ReportLocale::En).unwrap();
        assert_eq!(leap.bucket_count(), 29);
        assert_eq!(leap.buckets.labels().first().map(String::as_str), Some("1"));
        assert_eq!(leap.buckets.labels().last().map(String::as_str), Some("29"));
        assert_eq!(leap.granularity, Granularity::DayOfMonth);

        let common = PeriodSpec::month(2023, 2).resolve(ReportLocale::En).unwrap();
        assert_eq!(common.bucket_count(), 28);
    }

    #[test]
    fn test_december_month() {
        let period = PeriodSpec::month(2025, 12).resolve(ReportLocale::En).unwrap();

        assert_eq!(period.bucket_count(), 31);
        assert_eq!(period.range.start, midnight(2025, 12, 1));
        assert_eq!(period.range.end, midnight(2026, 1, 1));
        assert_eq!(period.label, "Month 12/2025");
    }

    #[test]
    fn test_invalid_quarter() {
        for quarter in [Some(0), Some(5), None] {
            let spec = PeriodSpec {
                mode: PeriodMode::Quarter,
                year: 2025,
                quarter,
                month: None,
            };
            let err = spec.resolve(ReportLocale::En).unwrap_err();
            assert_eq!(err.field(), Some("quarter"));
            assert!(err.to_string().contains("quarter"));
        }
    }

    #[test]
    fn test_invalid_month() {
        for month in [Some(0), Some(13), None] {
            let spec = PeriodSpec {
                mode: PeriodMode::Month,
                year: 2025,
                quarter: None,
                month,
            };
            let err = spec.resolve(ReportLocale::En).unwrap_err();
            assert_eq!(err.field(), Some("month"));
            assert!(err.to_string().contains("month"));
        }
    }

    #[test]
    fn test_unrepresentable_year() {
        let err = PeriodSpec::year(i32::MAX).resolve(ReportLocale::En).unwrap_err();
        assert_eq!(err.field(), Some("year"));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(" Quarter ".parse::<PeriodMode>().unwrap(), PeriodMode::Quarter);
        assert_eq!("YEAR".parse::<PeriodMode>().unwrap(), PeriodMode::Year);

        let err = "week".parse::<PeriodMode>().unwrap_err();
        assert_eq!(err.field(), Some("type"));
    }

    #[test]
    fn test_bucket_index_is_bijection() {
        let cases = [
            (PeriodSpec::year(2025), 1..=12),
            (PeriodSpec::quarter(2025, 1), 1..=3),
            (PeriodSpec::quarter(2025, 3), 7..=9),
            (PeriodSpec::month(2024, 2), 1..=29),
            (PeriodSpec::month(2025, 1), 1..=31),
        ];

        for (spec, ids) in cases {
            let period = spec.resolve(ReportLocale::En).unwrap();
            let indices: Vec<usize> = ids.map(|id| period.bucket_index(id).unwrap()).collect();
            let expected: Vec<usize> = (0..period.bucket_count()).collect();
            assert_eq!(indices, expected, "{:?}", spec);
        }
    }

    #[test]
    fn test_bucket_index_out_of_range() {
        let quarter = PeriodSpec::quarter(2025, 2).resolve(ReportLocale::En).unwrap();
        assert_eq!(quarter.bucket_index(3), None);
        assert_eq!(quarter.bucket_index(7), None);
        assert_eq!(quarter.bucket_index(i64::MIN), None);

        let month = PeriodSpec::month(2023, 2).resolve(ReportLocale::En).unwrap();
        assert_eq!(month.bucket_index(0), None);
        assert_eq!(month.bucket_index(29), None);
    }

    #[test]
    fn test_spanish_buckets() {
        let period = PeriodSpec::quarter(2025, 3).resolve(ReportLocale::Es).unwrap();
        assert_eq!(period.buckets.labels(), &["Jul", "Ago", "Sep"]);
        assert_eq!(period.label, "Trimestre 3 / 2025");
    }
}
