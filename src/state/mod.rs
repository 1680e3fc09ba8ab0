//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: Where the page loop is (fetching, parsing, writing, deciding, terminal)
//! - `CrawlCursor`: Current URL, page number and terminal flag of one run

mod crawl_phase;
mod cursor;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use cursor::CrawlCursor;
