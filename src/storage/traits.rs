//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::extractor::Listing;
use crate::storage::{Columns, Row, RunRecord, RunStatus, RunTotals, WriteOutcome};
use rusqlite::ToSql;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for listing storage backends
///
/// Holding a value of an implementing type means the schema exists; there is
/// no separate initialization step to forget.
pub trait ListingStore {
    // ===== Listings =====

    /// Inserts a listing
    ///
    /// A listing whose address or link is already stored is skipped and
    /// reported as [`WriteOutcome::DuplicateSkipped`]. Any other failure is
    /// reported as [`WriteOutcome::Failed`]; the caller decides whether to
    /// keep going.
    fn write(&mut self, listing: &Listing) -> WriteOutcome;

    /// Selects rows from the listings table
    ///
    /// # Arguments
    ///
    /// * `columns` - All columns, or a named subset (validated against the schema)
    /// * `clause` - Raw SQL appended after `FROM Homes`, e.g. a `WHERE` or
    ///   `ORDER BY`; empty for none
    /// * `params` - Values bound to `?` placeholders in `clause`
    ///
    /// Rows come back in storage order unless `clause` orders them.
    fn select(
        &self,
        columns: &Columns,
        clause: &str,
        params: &[&dyn ToSql],
    ) -> StorageResult<Vec<Row>>;

    /// Counts stored listings
    fn count_listings(&self) -> StorageResult<u64>;

    // ===== Run Management =====

    /// Creates a new crawl run in the `running` state
    fn create_run(&mut self, city: &str, state: &str, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run finished with its final status and totals
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        totals: &RunTotals,
        error_message: Option<&str>,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
