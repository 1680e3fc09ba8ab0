//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ListingStore trait.

use crate::extractor::Listing;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ListingStore, StorageError, StorageResult};
use crate::storage::{Columns, Row, RunRecord, RunStatus, RunTotals, WriteOutcome};
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{ffi, params, Connection, OptionalExtension, ToSql};
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, city, state, config_hash, status, \
                           pages_visited, listings_written, error_message";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and ensures the schema exists
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Database is open and ready for writes
    /// * `Err(StorageError)` - Failed to open database or create tables
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        tracing::info!("Initializing database at {}", path.display());
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn row_to_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<RunRecord> {
        Ok(RunRecord {
            id: row.get(0)?,
            started_at: row.get(1)?,
            finished_at: row.get(2)?,
            city: row.get(3)?,
            state: row.get(4)?,
            config_hash: row.get(5)?,
            status: RunStatus::from_db_string(&row.get::<_, String>(6)?)
                .unwrap_or(RunStatus::Aborted),
            pages_visited: row.get(7)?,
            listings_written: row.get::<_, i64>(8)? as u64,
            error_message: row.get(9)?,
        })
    }
}

/// Returns true if the error is a UNIQUE constraint violation
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl ListingStore for SqliteStorage {
    // ===== Listings =====

    fn write(&mut self, listing: &Listing) -> WriteOutcome {
        let result = self.conn.execute(
            "INSERT INTO Homes (Address, State, City, Zip_Code, Link, Description, Beds, Baths,
             Sqft, Price, Front_Pic, Available, Score)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                listing.address,
                listing.state,
                listing.city,
                listing.zip_code,
                listing.link,
                listing.description,
                listing.beds,
                listing.baths,
                listing.sqft,
                listing.price,
                listing.front_pic,
                listing.available,
                listing.score,
            ],
        );

        match result {
            Ok(_) => WriteOutcome::Inserted,
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!("Skipping already stored listing: {}", listing.address);
                WriteOutcome::DuplicateSkipped
            }
            Err(e) => {
                tracing::error!("Failed to store listing {}: {}", listing.address, e);
                WriteOutcome::Failed(e.to_string())
            }
        }
    }

    fn select(
        &self,
        columns: &Columns,
        clause: &str,
        params: &[&dyn ToSql],
    ) -> StorageResult<Vec<Row>> {
        let mut query = format!("SELECT {} FROM Homes", columns.to_sql()?);
        let clause = clause.trim();
        if !clause.is_empty() {
            query.push(' ');
            query.push_str(clause);
        }

        let mut stmt = self.conn.prepare(&query)?;
        let width = stmt.column_count();

        let rows = stmt
            .query_map(params, |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<Result<Row, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn count_listings(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM Homes", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Run Management =====

    fn create_run(&mut self, city: &str, state: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawl_runs (started_at, city, state, config_hash, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![now, city, state, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        totals: &RunTotals,
        error_message: Option<&str>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE crawl_runs SET status = ?1, finished_at = ?2, pages_visited = ?3,
             listings_written = ?4, error_message = ?5 WHERE id = ?6",
            params![
                status.to_db_string(),
                now,
                totals.pages_visited,
                totals.listings_written as i64,
                error_message,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM crawl_runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                Self::row_to_run,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM crawl_runs ORDER BY id DESC LIMIT 1",
                    RUN_COLUMNS
                ),
                [],
                Self::row_to_run,
            )
            .optional()?;
        Ok(run)
    }
}
