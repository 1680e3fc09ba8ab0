//! CSV export of stored listings
//!
//! Writes the listings of one city to a timestamped CSV file. When the city
//! has no stored rows the export widens to the whole state instead of
//! producing an empty file.

use crate::storage::{cell_to_string, Columns, ListingStore, HOME_COLUMNS};
use crate::HarvestError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which rows an export contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportScope {
    City { city: String, state: String },
    State { state: String },
}

impl fmt::Display for ExportScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::City { city, state } => write!(f, "{}, {}", city, state),
            Self::State { state } => write!(f, "all of {}", state),
        }
    }
}

/// Result of an export
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// File written
    pub path: PathBuf,
    /// Data rows written, header excluded
    pub rows: usize,
    pub scope: ExportScope,
}

/// Exports the stored listings of a city to CSV
///
/// The city is matched case-insensitively, with dashes treated as spaces so
/// that the URL form (`San-Diego`) matches the stored form (`San Diego`).
/// The file is named `{city}_{state}_homes_{timestamp}.csv`. If the city
/// matches nothing, every listing of the state is exported to
/// `{state}_homes_{timestamp}.csv` instead.
///
/// # Errors
///
/// Returns an error if the store cannot be queried or the file cannot be
/// written.
pub fn export_to_csv<S: ListingStore + ?Sized>(
    store: &S,
    city: &str,
    state: &str,
    dir: &Path,
) -> Result<ExportSummary, HarvestError> {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let city_name = city.replace('-', " ");

    let rows = store.select(
        &Columns::All,
        "WHERE City = ? COLLATE NOCASE AND State = ? COLLATE NOCASE",
        rusqlite::params![city_name, state],
    )?;

    let (rows, path, scope) = if rows.is_empty() {
        tracing::warn!(
            "No stored homes for {}, {}; exporting every home in {}",
            city,
            state,
            state
        );
        let rows = store.select(
            &Columns::All,
            "WHERE State = ? COLLATE NOCASE",
            rusqlite::params![state],
        )?;
        let path = dir.join(format!("{}_homes_{}.csv", state, timestamp));
        let scope = ExportScope::State {
            state: state.to_string(),
        };
        (rows, path, scope)
    } else {
        let path = dir.join(format!("{}_{}_homes_{}.csv", city, state, timestamp));
        let scope = ExportScope::City {
            city: city.to_string(),
            state: state.to_string(),
        };
        (rows, path, scope)
    };

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(HOME_COLUMNS)?;
    for row in &rows {
        writer.write_record(row.iter().map(cell_to_string))?;
    }
    writer.flush()?;

    tracing::info!(
        "Exported {} homes ({}) to {}",
        rows.len(),
        scope,
        path.display()
    );

    Ok(ExportSummary {
        path,
        rows: rows.len(),
        scope,
    })
}
