//! SQLite Record Store
//!
//! Stores one row per created entity: `(kind, created_at_ms)`. A composite
//! index on `(kind, created_at_ms)` keeps range-restricted grouped counts at
//! O(log n + k).
//!
//! Every operation runs on tokio's blocking pool with its own connection, so
//! concurrent report queries are not serialized behind a single handle. The
//! database runs in WAL mode, which lets readers proceed alongside a writer.

use crate::store::{
    DateRange, EntityKind, Granularity, GroupedCount, RecordStore, StoreError, StoreResult,
};
use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a connection waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed record store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Create or open a record database at `path`
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Self::connect(&path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                created_at_ms INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_kind_created ON records(kind, created_at_ms)",
            [],
        )?;

        tracing::debug!(path = ?path, "Record store opened");

        Ok(Self { path })
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(path: &Path) -> StoreResult<Connection> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// Run `f` against a fresh connection on the blocking pool
    async fn with_connection<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = Self::connect(&path)?;
            f(&mut conn)
        })
        .await?
    }

    /// Record many entities of one kind in a single transaction
    pub async fn insert_batch(&self, kind: EntityKind, created_at_ms: Vec<i64>) -> StoreResult<usize> {
        if created_at_ms.is_empty() {
            return Ok(0);
        }

        self.with_connection(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT INTO records (kind, created_at_ms) VALUES (?1, ?2)",
                )?;
                for timestamp in &created_at_ms {
                    stmt.execute(params![kind.storage_key(), timestamp])?;
                }
            }
            tx.commit()?;
            Ok(created_at_ms.len())
        })
        .await
    }
}

fn to_count(value: i64) -> StoreResult<u64> {
    u64::try_from(value).map_err(|_| StoreError::Corruption(format!("negative count {}", value)))
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn grouped_counts(
        &self,
        kind: EntityKind,
        range: DateRange,
        granularity: Granularity,
    ) -> StoreResult<Vec<GroupedCount>> {
        if range.start >= range.end {
            return Err(StoreError::InvalidRange);
        }

        self.with_connection(move |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT CAST(strftime(?1, created_at_ms / 1000.0, 'unixepoch') AS INTEGER) AS bucket,
                        COUNT(*)
                 FROM records
                 WHERE kind = ?2 AND created_at_ms >= ?3 AND created_at_ms < ?4
                 GROUP BY bucket
                 ORDER BY bucket",
            )?;

            let rows = stmt.query_map(
                params![
                    granularity.strftime_format(),
                    kind.storage_key(),
                    range.start,
                    range.end
                ],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )?;

            let mut counts = Vec::new();
            for row in rows {
                let (bucket_id, count) = row?;
                counts.push(GroupedCount::new(bucket_id, to_count(count)?));
            }

            Ok(counts)
        })
        .await
    }

    async fn count(&self, kind: EntityKind, range: DateRange) -> StoreResult<u64> {
        if range.start >= range.end {
            return Err(StoreError::InvalidRange);
        }

        self.with_connection(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM records
                 WHERE kind = ?1 AND created_at_ms >= ?2 AND created_at_ms < ?3",
                params![kind.storage_key(), range.start, range.end],
                |row| row.get(0),
            )?;
            to_count(count)
        })
        .await
    }

    async fn insert(&self, kind: EntityKind, created_at_ms: i64) -> StoreResult<i64> {
        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO records (kind, created_at_ms) VALUES (?1, ?2)",
                params![kind.storage_key(), created_at_ms],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }
}
