//! Crawler module for walking a paginated listing search
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Extracting the embedded listing data and the next-page link
//! - The page-by-page crawl loop

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{Coordinator, CrawlOutcome, CrawlSummary, TerminationReason};
pub use fetcher::{
    build_headers, build_http_client, FetchResult, Fetcher, HttpTransport, PageContent,
    Transport, TransportError,
};
pub use parser::{
    extract_next_page_url, extract_payload, parse_page, ParsedPage, PayloadError,
    RawListingsPayload,
};

use crate::config::Config;
use crate::HarvestError;

/// The city and state a search is run for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTarget {
    /// City as it appears in the search URL, e.g. `Fresno` or `San-Diego`
    pub city: String,
    /// Two-letter state code, e.g. `CA`
    pub state: String,
}

impl SearchTarget {
    /// Validates and builds a search target
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::Input` if the city is blank or the state is not
    /// two ASCII letters.
    pub fn new(city: &str, state: &str) -> Result<Self, HarvestError> {
        let city = city.trim();
        let state = state.trim();

        if city.is_empty() {
            return Err(HarvestError::Input("city must not be empty".to_string()));
        }
        if city.contains('/') {
            return Err(HarvestError::Input(format!(
                "city must not contain '/': {}",
                city
            )));
        }
        if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(HarvestError::Input(format!(
                "state must be a two-letter code, got '{}'",
                state
            )));
        }

        Ok(Self {
            city: city.to_string(),
            state: state.to_string(),
        })
    }
}

/// Runs a complete harvest for one city
///
/// This is the main entry point for a crawl. It will:
/// 1. Open the SQLite database from the config
/// 2. Build the HTTP client and header set
/// 3. Walk the search pages until the last one (or a fatal fetch)
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `target` - City and state to search
/// * `config_hash` - Hash of the config file, recorded with the run
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - The run finished; check `outcome` for an abort
/// * `Err(HarvestError)` - The database or HTTP client could not be set up
pub async fn crawl(
    config: &Config,
    target: SearchTarget,
    config_hash: &str,
) -> Result<CrawlSummary, HarvestError> {
    let mut coordinator = Coordinator::from_config(config, target, config_hash)?;
    coordinator.run().await
}
