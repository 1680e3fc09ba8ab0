//! Output module for exports and reports
//!
//! This module handles:
//! - Exporting stored listings to CSV
//! - Reporting harvest statistics and crawl summaries

mod csv_export;
pub mod stats;

pub use csv_export::{export_to_csv, ExportScope, ExportSummary};
pub use stats::{load_statistics, print_crawl_summary, print_statistics, HarvestStatistics};
