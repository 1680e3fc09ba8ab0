//! Storage module for persisting harvested listings
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Idempotent listing writes keyed on address and link
//! - Ad-hoc selects used by reporting and CSV export
//! - Crawl run tracking

mod schema;
mod sqlite;
mod traits;

pub use schema::{is_home_column, HOME_COLUMNS};
pub use sqlite::SqliteStorage;
pub use traits::{ListingStore, StorageError, StorageResult};

use rusqlite::types::Value;
use std::fmt;

/// One selected row, cells in the requested column order
pub type Row = Vec<Value>;

/// Outcome of writing one listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A new row was stored
    Inserted,

    /// The address or link was already stored; nothing changed
    DuplicateSkipped,

    /// The write failed for another reason and the listing was dropped
    Failed(String),
}

impl WriteOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted)
    }
}

/// Column selection for [`ListingStore::select`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Columns {
    /// Every column, in table order
    All,

    /// A named subset, in the given order
    Named(Vec<String>),
}

impl Columns {
    /// Builds a named selection from string slices
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Named(names.into_iter().map(Into::into).collect())
    }

    /// Renders the SQL column list, rejecting names outside the schema
    pub fn to_sql(&self) -> StorageResult<String> {
        match self {
            Self::All => Ok("*".to_string()),
            Self::Named(names) if names.is_empty() => Ok("*".to_string()),
            Self::Named(names) => {
                if let Some(bad) = names.iter().find(|name| !is_home_column(name)) {
                    return Err(StorageError::UnknownColumn(bad.clone()));
                }
                Ok(names.join(", "))
            }
        }
    }
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub city: String,
    pub state: String,
    pub config_hash: String,
    pub status: RunStatus,
    pub pages_visited: u32,
    pub listings_written: u64,
    pub error_message: Option<String>,
}

/// Totals recorded when a run finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub pages_visited: u32,
    pub listings_written: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Aborted,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "aborted" => Some(Self::Aborted),
            _ => None,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// Renders a selected cell as plain text (NULL becomes an empty string)
pub fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}
