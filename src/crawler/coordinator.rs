//! Crawler coordinator - the paginated crawl loop
//!
//! This module contains the loop that walks one search, page by page:
//! - Fetching the page at the cursor
//! - Parsing out the embedded homes and the next-page link
//! - Extracting and writing every home
//! - Advancing the cursor or stopping
//!
//! Pages are handled strictly one at a time; the next URL is only known once
//! the current page has been parsed.

use crate::config::Config;
use crate::crawler::fetcher::{build_headers, FetchResult, Fetcher, HttpTransport, Transport};
use crate::crawler::parser::parse_page;
use crate::crawler::SearchTarget;
use crate::extractor::extract_all;
use crate::state::{CrawlCursor, CrawlPhase};
use crate::storage::{ListingStore, RunStatus, RunTotals, SqliteStorage, WriteOutcome};
use crate::HarvestError;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Why a crawl stopped normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The last page had no "next page" control
    LastPage,

    /// A page carried no listing data
    NoHomes,

    /// The configured page cap was reached
    PageLimit,

    /// The next-page link pointed at a page already visited in this run
    Revisited,
}

/// How a crawl ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// Reached Terminal through the normal path
    Completed(TerminationReason),

    /// A page could not be fetched; pages stored before it are kept
    Aborted {
        url: String,
        attempts: u32,
        error: String,
    },
}

impl CrawlOutcome {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

/// Totals for one crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub run_id: i64,
    /// Pages fetched successfully
    pub pages_visited: u32,
    /// Raw homes encountered across all pages
    pub listings_seen: u64,
    /// Homes newly stored
    pub listings_written: u64,
    /// Homes already in the store
    pub duplicates_skipped: u64,
    /// Homes dropped because the write failed
    pub write_failures: u64,
    pub outcome: CrawlOutcome,
}

impl CrawlSummary {
    fn new(run_id: i64) -> Self {
        Self {
            run_id,
            pages_visited: 0,
            listings_seen: 0,
            listings_written: 0,
            duplicates_skipped: 0,
            write_failures: 0,
            outcome: CrawlOutcome::Completed(TerminationReason::LastPage),
        }
    }

    fn record(&mut self, outcome: &WriteOutcome) {
        self.listings_seen += 1;
        match outcome {
            WriteOutcome::Inserted => self.listings_written += 1,
            WriteOutcome::DuplicateSkipped => self.duplicates_skipped += 1,
            WriteOutcome::Failed(_) => self.write_failures += 1,
        }
    }

    fn totals(&self) -> RunTotals {
        RunTotals {
            pages_visited: self.pages_visited,
            listings_written: self.listings_written,
        }
    }
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages visited, {} homes seen, {} written, {} already stored, {} failed",
            self.pages_visited,
            self.listings_seen,
            self.listings_written,
            self.duplicates_skipped,
            self.write_failures
        )
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<T, S> {
    fetcher: Fetcher<T>,
    store: S,
    cursor: CrawlCursor,
    phase: CrawlPhase,
    target: SearchTarget,
    base_url: Url,
    config_hash: String,
    max_pages: u32,
    visited: HashSet<String>,
}

impl Coordinator<HttpTransport, SqliteStorage> {
    /// Creates a coordinator that writes into the configured SQLite database
    pub fn from_config(
        config: &Config,
        target: SearchTarget,
        config_hash: &str,
    ) -> Result<Self, HarvestError> {
        let store = SqliteStorage::open(Path::new(&config.output.database_path))?;
        Coordinator::with_store(config, target, config_hash, store)
    }
}

impl<S: ListingStore> Coordinator<HttpTransport, S> {
    /// Creates an HTTP-backed coordinator around an already opened store
    pub fn with_store(
        config: &Config,
        target: SearchTarget,
        config_hash: &str,
        store: S,
    ) -> Result<Self, HarvestError> {
        let transport = HttpTransport::from_config(&config.crawler)?;
        let headers = build_headers(&config.headers)?;
        let fetcher = Fetcher::new(
            transport,
            headers,
            config.crawler.max_retries,
            Duration::from_millis(config.crawler.retry_delay_ms),
        );

        Ok(Coordinator::new(fetcher, store, target, &config.crawler.base_url)?
            .with_config_hash(config_hash)
            .with_max_pages(config.crawler.max_pages))
    }
}

impl<T: Transport, S: ListingStore> Coordinator<T, S> {
    /// Creates a coordinator positioned at page 1 of the target's search
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::UrlParse` if `base_url` is not a valid URL.
    pub fn new(
        fetcher: Fetcher<T>,
        store: S,
        target: SearchTarget,
        base_url: &str,
    ) -> Result<Self, HarvestError> {
        let cursor = CrawlCursor::for_city(base_url, &target.city, &target.state);
        let base_url = Url::parse(cursor.base_url())?;

        Ok(Self {
            fetcher,
            store,
            cursor,
            phase: CrawlPhase::Fetching,
            target,
            base_url,
            config_hash: String::new(),
            max_pages: 0,
            visited: HashSet::new(),
        })
    }

    /// Sets the configuration hash recorded with the run
    pub fn with_config_hash(mut self, config_hash: impl Into<String>) -> Self {
        self.config_hash = config_hash.into();
        self
    }

    /// Caps the number of pages fetched; 0 means no cap
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn cursor(&self) -> &CrawlCursor {
        &self.cursor
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs the crawl loop until it reaches Terminal
    ///
    /// # Loop
    ///
    /// 1. Fetching: fatal fetch failure → record the run as aborted, Terminal
    /// 2. Parsing: no embedded homes → Terminal, no next-page lookup
    /// 3. Extracting and writing: every home is extracted and written;
    ///    write failures are counted and skipped
    /// 4. Deciding: next-page link present → advance cursor, back to 1;
    ///    absent, already visited, or page cap reached → Terminal
    ///
    /// # Errors
    ///
    /// Only bookkeeping failures surface here (the run ledger could not be
    /// written, or the coordinator was already terminal). A fatal fetch is
    /// reported through [`CrawlOutcome::Aborted`], not as an error.
    pub async fn run(&mut self) -> Result<CrawlSummary, HarvestError> {
        if self.cursor.is_terminal() {
            return Err(HarvestError::CursorTerminal {
                url: self.cursor.current_url().to_string(),
            });
        }

        let run_id = self
            .store
            .create_run(&self.target.city, &self.target.state, &self.config_hash)?;
        let mut summary = CrawlSummary::new(run_id);

        tracing::info!(
            "Starting crawl run {} for {}, {}",
            run_id,
            self.target.city,
            self.target.state
        );

        let outcome = loop {
            // Fetching
            let url = self.cursor.current_url().to_string();
            tracing::info!("Fetching page {}: {}", self.cursor.page(), url);
            self.visited.insert(visit_key(&url));

            let page = match self.fetcher.fetch(&url).await {
                FetchResult::Success(page) => page,
                FetchResult::Fatal { attempts, error } => {
                    tracing::error!(
                        "Abandoning crawl at page {} after {} attempts: {}",
                        self.cursor.page(),
                        attempts,
                        error
                    );
                    self.finish()?;
                    break CrawlOutcome::Aborted {
                        url,
                        attempts,
                        error: error.to_string(),
                    };
                }
            };
            summary.pages_visited += 1;
            tracing::debug!(
                "Fetched {} (HTTP {}, {} bytes)",
                page.url,
                page.status_code,
                page.body.len()
            );

            // Parsing
            self.transition(CrawlPhase::Parsing)?;
            let page_url = Url::parse(&page.url).unwrap_or_else(|_| self.base_url.clone());
            let parsed = parse_page(&page.body, &page_url);

            let homes = match parsed.payload {
                Ok(homes) => homes,
                Err(e) => {
                    tracing::warn!(
                        "No homes found in {}, {} ({})",
                        self.target.city,
                        self.target.state,
                        e
                    );
                    self.finish()?;
                    break CrawlOutcome::Completed(TerminationReason::NoHomes);
                }
            };

            // Extracting and writing
            self.transition(CrawlPhase::ExtractingAndWriting)?;
            tracing::info!(
                "Gathering {} homes from page {}",
                homes.len(),
                self.cursor.page()
            );
            for listing in extract_all(&homes) {
                if listing.is_partial() {
                    tracing::debug!("{} (some fields unknown)", listing);
                } else {
                    tracing::debug!("{}", listing);
                }
                let outcome = self.store.write(&listing);
                summary.record(&outcome);
            }

            // Deciding next page
            self.transition(CrawlPhase::DecidingNextPage)?;

            if self.max_pages > 0 && summary.pages_visited >= self.max_pages {
                tracing::info!("Reached page limit of {}", self.max_pages);
                self.finish()?;
                break CrawlOutcome::Completed(TerminationReason::PageLimit);
            }

            match parsed.next_page {
                Some(next_url) if self.visited.contains(&visit_key(&next_url)) => {
                    tracing::warn!("Next page {} was already visited; stopping", next_url);
                    self.finish()?;
                    break CrawlOutcome::Completed(TerminationReason::Revisited);
                }
                Some(next_url) => {
                    self.cursor.advance(next_url)?;
                    self.transition(CrawlPhase::Fetching)?;
                    tracing::info!("Going to next page. Current page: {}", self.cursor.page());
                }
                None => {
                    self.finish()?;
                    break CrawlOutcome::Completed(TerminationReason::LastPage);
                }
            }
        };

        summary.outcome = outcome;

        let (status, error_message) = match &summary.outcome {
            CrawlOutcome::Completed(_) => (RunStatus::Completed, None),
            CrawlOutcome::Aborted { error, .. } => (RunStatus::Aborted, Some(error.as_str())),
        };
        self.store
            .finish_run(run_id, status, &summary.totals(), error_message)?;

        tracing::info!("Finished searching for homes: {}", summary);

        Ok(summary)
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Moves to Terminal and closes the cursor
    fn finish(&mut self) -> Result<(), HarvestError> {
        self.transition(CrawlPhase::Terminal)?;
        self.cursor.terminate();
        Ok(())
    }
}

/// Normalized form of a URL used to detect pages seen earlier in a run
fn visit_key(url: &str) -> String {
    Url::parse(url)
        .map(|parsed| parsed.to_string())
        .unwrap_or_else(|_| url.to_string())
}
