//! SQLite cache implementation

use super::AggregateStore;
use crate::records::{AggregateRecord, Filters, Metric, MetricValues};
use crate::{MgnregaError, Result};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Path to SQLite database file
    pub path: PathBuf,

    /// Enable WAL mode so readers don't block the insert path
    pub wal_mode: bool,

    /// How long a statement waits on a locked database before failing
    pub busy_timeout: Duration,
}

impl CacheConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            wal_mode: true,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// A cached aggregate row as stored
///
/// Metric columns are nullable. NULL means no upstream row had a usable value;
/// it is served as `0` but never stored as one.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedRow {
    pub state_name: String,
    pub district_name: String,
    pub fin_year: String,
    pub month: String,
    pub state_code: Option<String>,
    pub metrics: [Option<f64>; Metric::COUNT],
}

impl CachedRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let mut metrics = [None; Metric::COUNT];
        for (i, slot) in metrics.iter_mut().enumerate() {
            *slot = row.get(5 + i)?;
        }

        Ok(Self {
            state_name: row.get(0)?,
            district_name: row.get(1)?,
            fin_year: row.get(2)?,
            month: row.get(3)?,
            state_code: row.get(4)?,
            metrics,
        })
    }
}

impl From<CachedRow> for AggregateRecord {
    fn from(row: CachedRow) -> Self {
        let metrics: MetricValues = Metric::ALL
            .iter()
            .zip(row.metrics)
            .map(|(m, v)| (*m, v))
            .collect();

        Self {
            state_name: row.state_name,
            district_name: row.district_name,
            fin_year: row.fin_year,
            month: row.month,
            state_code: row.state_code,
            metrics,
        }
    }
}

/// SQLite-backed store of aggregate records
pub struct Cache {
    conn: Connection,
    config: CacheConfig,
}

impl Cache {
    /// Open or create a cache database
    pub fn new(config: CacheConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    MgnregaError::StorageUnavailable(format!("{}: {}", parent.display(), e))
                })?;
            }
        }

        tracing::info!(path = %config.path.display(), "Opening cache database");

        let conn = Connection::open(&config.path).map_err(|e| {
            MgnregaError::StorageUnavailable(format!("{}: {}", config.path.display(), e))
        })?;

        Self::from_connection(conn, config)
    }

    /// In-memory cache, mostly for tests and one-off queries
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| MgnregaError::StorageUnavailable(e.to_string()))?;
        let config = CacheConfig {
            path: PathBuf::from(":memory:"),
            wal_mode: false,
            busy_timeout: Duration::from_secs(5),
        };
        Self::from_connection(conn, config)
    }

    fn from_connection(conn: Connection, config: CacheConfig) -> Result<Self> {
        conn.busy_timeout(config.busy_timeout)?;

        if config.wal_mode {
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }

        let cache = Self { conn, config };
        cache.init_schema()?;

        Ok(cache)
    }

    /// Initialize database schema
    ///
    /// The UNIQUE constraint is what makes concurrent inserts of the same
    /// key safe; inserts rely on it instead of checking first.
    fn init_schema(&self) -> Result<()> {
        let metric_columns: String = Metric::ALL
            .iter()
            .map(|m| format!("                {} REAL,\n", m.column()))
            .collect();

        self.conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS aggregates (
                id INTEGER PRIMARY KEY,
                state_name TEXT NOT NULL,
                district_name TEXT NOT NULL,
                fin_year TEXT NOT NULL,
                month TEXT NOT NULL,
                state_code TEXT,
{metric_columns}                cached_at TEXT NOT NULL,
                UNIQUE (state_name, district_name, fin_year, month)
            );

            CREATE INDEX IF NOT EXISTS idx_aggregates_district ON aggregates(district_name);
            CREATE INDEX IF NOT EXISTS idx_aggregates_fin_year ON aggregates(fin_year);
            "#
        ))?;

        Ok(())
    }

    fn select_columns() -> String {
        let mut columns = vec!["state_name", "district_name", "fin_year", "month", "state_code"];
        columns.extend(Metric::ALL.iter().map(|m| m.column()));
        columns.join(", ")
    }

    /// Rows exactly matching the supplied filters, in insertion order
    pub fn lookup_rows(&self, filters: &Filters) -> Result<Vec<CachedRow>> {
        let sql = format!(
            "SELECT {} FROM aggregates
             WHERE (?1 IS NULL OR state_name = ?1)
               AND (?2 IS NULL OR district_name = ?2)
               AND (?3 IS NULL OR fin_year = ?3)
             ORDER BY id",
            Self::select_columns()
        );

        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(
                params![filters.state, filters.district, filters.year],
                CachedRow::from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        tracing::debug!(
            state = ?filters.state,
            district = ?filters.district,
            year = ?filters.year,
            rows = rows.len(),
            "Cache lookup"
        );

        Ok(rows)
    }

    /// Insert records, skipping any whose key already exists
    ///
    /// Existing rows are never updated. Returns how many rows were new.
    pub fn insert_records(&self, records: &[AggregateRecord]) -> Result<usize> {
        let mut columns = vec!["state_name", "district_name", "fin_year", "month", "state_code"];
        columns.extend(Metric::ALL.iter().map(|m| m.column()));
        columns.push("cached_at");
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT OR IGNORE INTO aggregates ({}) VALUES ({})",
            columns.join(", "),
            placeholders
        );

        let cached_at = chrono::Utc::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;

        {
            let mut stmt = tx.prepare_cached(&sql)?;
            for record in records {
                let mut values = vec![
                    Value::Text(record.state_name.clone()),
                    Value::Text(record.district_name.clone()),
                    Value::Text(record.fin_year.clone()),
                    Value::Text(record.month.clone()),
                    record.state_code.clone().map_or(Value::Null, Value::Text),
                ];
                values.extend(
                    record
                        .metrics
                        .iter()
                        .map(|(_, v)| v.map_or(Value::Null, Value::Real)),
                );
                values.push(Value::Text(cached_at.clone()));

                inserted += stmt.execute(params_from_iter(values))?;
            }
        }

        tx.commit()?;

        tracing::debug!(
            offered = records.len(),
            inserted,
            "Stored aggregates in cache"
        );
        Ok(inserted)
    }

    /// Get cache statistics
    pub fn stats(&self) -> Result<CacheStats> {
        let row_count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM aggregates", [], |row| row.get(0))?;
        let state_count: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT state_name) FROM aggregates",
            [],
            |row| row.get(0),
        )?;
        let last_cached_at: Option<String> =
            self.conn
                .query_row("SELECT MAX(cached_at) FROM aggregates", [], |row| row.get(0))?;

        Ok(CacheStats {
            row_count: row_count as usize,
            state_count: state_count as usize,
            last_cached_at,
        })
    }

    /// Get the database path
    pub fn path(&self) -> &Path {
        &self.config.path
    }
}

impl AggregateStore for Cache {
    fn lookup(&self, filters: &Filters) -> Result<Vec<AggregateRecord>> {
        Ok(self
            .lookup_rows(filters)?
            .into_iter()
            .map(AggregateRecord::from)
            .collect())
    }

    fn insert_all(&self, records: &[AggregateRecord]) -> Result<usize> {
        self.insert_records(records)
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub row_count: usize,
    pub state_count: usize,
    pub last_cached_at: Option<String>,
}
