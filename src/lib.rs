//! Homes-Harvest: a paginated real-estate listing harvester
//!
//! This crate walks a paginated listing search (one city at a time), pulls the
//! structured listing data embedded in each page, and stores every listing in
//! SQLite so that repeated harvests of the same search never duplicate rows.

pub mod config;
pub mod crawler;
pub mod extractor;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Homes-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cursor is terminal; cannot advance to {url}")]
    CursorTerminal { url: String },

    #[error("Invalid crawl transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("Invalid input: {0}")]
    Input(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Homes-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlSummary};
pub use extractor::{extract_listing, Listing};
pub use state::{CrawlCursor, CrawlPhase};
pub use storage::{ListingStore, SqliteStorage, WriteOutcome};
