//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Homes-Harvest database.

/// Columns of the `Homes` table, in table order
pub const HOME_COLUMNS: [&str; 13] = [
    "Address",
    "State",
    "City",
    "Zip_Code",
    "Link",
    "Description",
    "Beds",
    "Baths",
    "Sqft",
    "Price",
    "Front_Pic",
    "Available",
    "Score",
];

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per harvested listing
CREATE TABLE IF NOT EXISTS Homes (
    Address VARCHAR(125) UNIQUE,
    State VARCHAR(50),
    City VARCHAR(50),
    Zip_Code CHAR(5),
    Link VARCHAR(50) UNIQUE,
    Description VARCHAR(500),
    Beds INTEGER,
    Baths INTEGER,
    Sqft INTEGER,
    Price INTEGER,
    Front_Pic VARCHAR(150),
    Available BOOLEAN,
    Score INTEGER
);

-- Track harvest runs
CREATE TABLE IF NOT EXISTS crawl_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    pages_visited INTEGER NOT NULL DEFAULT 0,
    listings_written INTEGER NOT NULL DEFAULT 0,
    error_message TEXT
);
"#;

/// Initializes the database schema
///
/// Safe to call on every open; every statement is `IF NOT EXISTS`.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Returns true if `name` is a column of the `Homes` table
pub fn is_home_column(name: &str) -> bool {
    HOME_COLUMNS.contains(&name)
}
