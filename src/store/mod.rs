//! HOPE Record Store
//!
//! The report engine only needs a handful of read primitives from the hospital's
//! record collections. This module defines them as the [`RecordStore`] trait and
//! ships a SQLite-backed implementation:
//!
//! - **types**: Entity kinds, date ranges, grouping granularity
//! - **sqlite**: `SqliteStore`, one `records` table keyed by kind and creation time
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use hope::store::{DateRange, EntityKind, Granularity, RecordStore, SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::open("./hope_data/records.db")?;
//!
//!     store.insert(EntityKind::Patient, chrono::Utc::now().timestamp_millis()).await?;
//!
//!     let range = DateRange::try_new(0, i64::MAX).unwrap();
//!     let rows = store
//!         .grouped_counts(EntityKind::Patient, range, Granularity::MonthOfYear)
//!         .await?;
//!
//!     println!("{} month buckets with patients", rows.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod sqlite;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use sqlite::SqliteStore;
pub use types::{DateRange, EntityKind, Granularity, GroupedCount};

use async_trait::async_trait;

/// Read/write primitives over the hospital's record collections
///
/// Implementations must be safe to query concurrently: the report engine issues
/// one `grouped_counts` call per entity kind at the same time.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Count records of `kind` created in `range`, grouped by the calendar field
    /// `granularity` extracts from the creation timestamp (UTC).
    ///
    /// Each bucket id appears at most once in the result; buckets without
    /// records are omitted.
    async fn grouped_counts(
        &self,
        kind: EntityKind,
        range: DateRange,
        granularity: Granularity,
    ) -> StoreResult<Vec<GroupedCount>>;

    /// Count records of `kind` created in `range`
    async fn count(&self, kind: EntityKind, range: DateRange) -> StoreResult<u64>;

    /// Record the creation of one entity, returning its row id
    async fn insert(&self, kind: EntityKind, created_at_ms: i64) -> StoreResult<i64>;
}
