//! Statistics generation from the listings database
//!
//! This module provides functionality for extracting and displaying
//! harvest statistics from the storage layer.

use crate::crawler::{CrawlOutcome, CrawlSummary, TerminationReason};
use crate::storage::{cell_to_string, Columns, ListingStore, RunRecord};
use crate::HarvestError;
use std::collections::BTreeMap;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Total number of stored listings
    pub total_listings: u64,

    /// Listing count per (state, city), sorted by state then city
    pub listings_by_city: BTreeMap<(String, String), u64>,

    /// Most recent crawl run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The storage backend to query
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query statistics
pub fn load_statistics<S: ListingStore + ?Sized>(
    store: &S,
) -> Result<HarvestStatistics, HarvestError> {
    let total_listings = store.count_listings()?;

    let mut listings_by_city = BTreeMap::new();
    for row in store.select(&Columns::named(["State", "City"]), "", &[])? {
        let state = row.first().map(cell_to_string).unwrap_or_default();
        let city = row.get(1).map(cell_to_string).unwrap_or_default();
        *listings_by_city.entry((state, city)).or_insert(0) += 1;
    }

    let latest_run = store.get_latest_run()?;

    Ok(HarvestStatistics {
        total_listings,
        listings_by_city,
        latest_run,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Total homes stored: {}", stats.total_listings);
    println!("  Cities: {}", stats.listings_by_city.len());
    println!();

    if !stats.listings_by_city.is_empty() {
        println!("Homes by City:");
        for ((state, city), count) in &stats.listings_by_city {
            println!("  {}, {}: {}", city, state, count);
        }
        println!();
    }

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run (#{}):", run.id);
            println!("  Search: {}, {}", run.city, run.state);
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!("  Status: {}", run.status);
            println!("  Pages visited: {}", run.pages_visited);
            println!("  Homes written: {}", run.listings_written);
            if let Some(message) = &run.error_message {
                println!("  Error: {}", message);
            }
        }
        None => println!("No crawl runs recorded."),
    }
}

/// Prints the result of a finished crawl
pub fn print_crawl_summary(summary: &CrawlSummary) {
    println!("\n=== Crawl Summary (run #{}) ===\n", summary.run_id);
    println!("  Pages visited: {}", summary.pages_visited);
    println!("  Homes seen: {}", summary.listings_seen);
    println!("  Homes written: {}", summary.listings_written);
    println!("  Already stored: {}", summary.duplicates_skipped);
    println!("  Failed writes: {}", summary.write_failures);

    match &summary.outcome {
        CrawlOutcome::Completed(reason) => {
            let reason = match reason {
                TerminationReason::LastPage => "reached the last page",
                TerminationReason::NoHomes => "no homes found",
                TerminationReason::PageLimit => "page limit reached",
                TerminationReason::Revisited => "pagination looped back to a visited page",
            };
            println!("\n✓ Finished: {}", reason);
        }
        CrawlOutcome::Aborted {
            url,
            attempts,
            error,
        } => {
            println!(
                "\n✗ Aborted at {} after {} attempts: {}",
                url, attempts, error
            );
            println!("  Homes stored before the failure were kept.");
        }
    }
}
