//! Homes-Harvest main entry point
//!
//! This is the command-line interface for the Homes-Harvest listing harvester.

use clap::Parser;
use homes_harvest::config::{load_config_with_hash, Config};
use homes_harvest::crawler::{crawl, SearchTarget};
use homes_harvest::state::CrawlCursor;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Homes-Harvest: a paginated real-estate listing harvester
///
/// Homes-Harvest walks the search results of one city page by page, stores
/// every listing in SQLite without duplicates, and can export the stored
/// listings to CSV.
#[derive(Parser, Debug)]
#[command(name = "homes-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A paginated real-estate listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// City to search, as it appears in the site's URLs (e.g. San-Diego)
    #[arg(long, required_unless_present = "stats")]
    city: Option<String>,

    /// Two-letter state code (e.g. CA)
    #[arg(long, required_unless_present = "stats")]
    state: Option<String>,

    /// Export the city's listings to CSV after crawling
    #[arg(long, conflicts_with_all = ["export_only", "dry_run", "stats"])]
    export: bool,

    /// Export the city's stored listings to CSV without crawling
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_only: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.stats {
        return handle_stats(&config);
    }

    let target = SearchTarget::new(
        cli.city.as_deref().unwrap_or_default(),
        cli.state.as_deref().unwrap_or_default(),
    )?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, &target);
    } else if cli.export_only {
        handle_export(&config, &target)?;
    } else {
        handle_crawl(&config, &target, &config_hash).await?;
        if cli.export {
            handle_export(&config, &target)?;
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("homes_harvest=info,warn"),
            1 => EnvFilter::new("homes_harvest=debug,info"),
            2 => EnvFilter::new("homes_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, target: &SearchTarget) {
    println!("=== Homes-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Max retries: {}", config.crawler.max_retries);
    println!("  Retry delay: {}ms", config.crawler.retry_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    if config.crawler.max_pages > 0 {
        println!("  Max pages: {}", config.crawler.max_pages);
    } else {
        println!("  Max pages: unlimited");
    }

    println!("\nHeaders:");
    println!("  User-Agent: {}", config.headers.user_agent);
    println!("  Accept: {}", config.headers.accept);
    println!("  Accept-Language: {}", config.headers.accept_language);
    println!("  Accept-Encoding: {}", config.headers.accept_encoding);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Export directory: {}", config.output.export_dir);

    let cursor = CrawlCursor::for_city(&config.crawler.base_url, &target.city, &target.state);

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling at {}", cursor.current_url());
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use homes_harvest::output::{load_statistics, print_statistics};
    use homes_harvest::storage::SqliteStorage;

    println!("Database: {}\n", config.output.database_path);

    // Open the database
    let storage = SqliteStorage::open(Path::new(&config.output.database_path))?;

    // Load statistics
    let stats = load_statistics(&storage)?;

    // Print statistics
    print_statistics(&stats);

    Ok(())
}

/// Handles --export and --export-only: writes the city's listings to CSV
fn handle_export(config: &Config, target: &SearchTarget) -> Result<(), Box<dyn std::error::Error>> {
    use homes_harvest::output::export_to_csv;
    use homes_harvest::storage::SqliteStorage;

    let storage = SqliteStorage::open(Path::new(&config.output.database_path))?;
    let summary = export_to_csv(
        &storage,
        &target.city,
        &target.state,
        Path::new(&config.output.export_dir),
    )?;

    println!(
        "✓ Exported {} homes ({}) to: {}",
        summary.rows,
        summary.scope,
        summary.path.display()
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    target: &SearchTarget,
    config_hash: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    use homes_harvest::output::print_crawl_summary;

    tracing::info!(
        "Searching for homes in {}, {}",
        target.city,
        target.state
    );

    // Run the crawler
    match crawl(config, target.clone(), config_hash).await {
        Ok(summary) => {
            if summary.outcome.is_aborted() {
                tracing::warn!("Crawl aborted; homes already stored were kept");
            } else {
                tracing::info!("Crawl completed successfully");
            }
            print_crawl_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
