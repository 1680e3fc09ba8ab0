//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end against a SQLite file.

use homes_harvest::config::{Config, CrawlerConfig, HeaderConfig, OutputConfig};
use homes_harvest::crawler::{Coordinator, CrawlOutcome, SearchTarget, TerminationReason};
use homes_harvest::output::{export_to_csv, ExportScope};
use homes_harvest::storage::{cell_to_string, Columns, ListingStore, RunStatus, SqliteStorage};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at `base_url`
fn create_test_config(base_url: &str, db_path: &Path, export_dir: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            base_url: base_url.to_string(),
            max_retries: 5,
            retry_delay_ms: 0,
            request_timeout_secs: 5,
            max_pages: 0,
        },
        headers: HeaderConfig::default(),
        output: OutputConfig {
            database_path: db_path.to_string_lossy().to_string(),
            export_dir: export_dir.to_string_lossy().to_string(),
        },
    }
}

/// Renders one raw home the way search pages embed it
fn home_json(number: u32, street: &str, city: &str) -> String {
    format!(
        r#"{{
            "url": "/p/ca/fresno/{number}-{slug}",
            "location": {{
                "streetAddress": "{number} {street}",
                "city": "{city}",
                "stateCode": "CA",
                "zipCode": "93701"
            }},
            "bedrooms": {{ "formattedValue": "3bd" }},
            "bathrooms": {{ "formattedValue": "2ba" }},
            "floorSpace": {{ "formattedDimension": "1,450 sqft" }},
            "price": {{ "price": "$350,000" }},
            "currentStatus": {{ "isActiveForSale": true }}
        }}"#,
        number = number,
        slug = street.to_lowercase().replace(' ', "-"),
        street = street,
        city = city
    )
}

/// Renders a search page with the given homes and optional next-page link
fn search_page(homes: &[String], next_href: Option<&str>) -> String {
    let pagination = match next_href {
        Some(href) => format!(
            r#"<nav aria-label="search results pagination"><ul>
                <li data-testid="pagination-page-1"><a href="/CA/Fresno">1</a></li>
                <li data-testid="pagination-next-page"><a href="{}">Next</a></li>
            </ul></nav>"#,
            href
        ),
        None => r#"<nav aria-label="search results pagination"><ul>
                <li data-testid="pagination-page-1"><a href="/CA/Fresno">1</a></li>
            </ul></nav>"#
            .to_string(),
    };

    format!(
        r#"<html><head><title>Fresno, CA Real Estate</title></head><body>
        <div id="results"></div>
        {}
        <script id="__NEXT_DATA__" type="application/json">
        {{"props":{{"searchData":{{"homes":[{}]}}}}}}
        </script>
        </body></html>"#,
        pagination,
        homes.join(",")
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: String, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(expected_hits)
        .mount(server)
        .await;
}

/// Mounts three pages of Fresno results, two homes each
async fn mount_three_pages(server: &MockServer, expected_hits: u64) {
    mount_page(
        server,
        "/CA/Fresno",
        search_page(
            &[home_json(1, "Olive Ave", "Fresno"), home_json(2, "Palm Ave", "Fresno")],
            Some("/CA/Fresno/2_p/"),
        ),
        expected_hits,
    )
    .await;
    mount_page(
        server,
        "/CA/Fresno/2_p/",
        search_page(
            &[home_json(3, "Blackstone Ave", "Fresno"), home_json(4, "Shaw Ave", "Fresno")],
            Some("/CA/Fresno/3_p/"),
        ),
        expected_hits,
    )
    .await;
    mount_page(
        server,
        "/CA/Fresno/3_p/",
        search_page(
            &[home_json(5, "Tulare St", "Fresno"), home_json(6, "Kings Canyon Rd", "Fresno")],
            None,
        ),
        expected_hits,
    )
    .await;
}

async fn run_once(config: &Config) -> homes_harvest::CrawlSummary {
    let store = SqliteStorage::open(Path::new(&config.output.database_path))
        .expect("Failed to open database");
    let target = SearchTarget::new("Fresno", "CA").expect("Invalid target");
    let mut coordinator = Coordinator::with_store(config, target, "test-hash", store)
        .expect("Failed to create coordinator");
    coordinator.run().await.expect("Crawl failed")
}

#[tokio::test]
async fn test_full_crawl_follows_pagination() {
    let mock_server = MockServer::start().await;
    mount_three_pages(&mock_server, 1).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("homes.db");
    let config = create_test_config(&mock_server.uri(), &db_path, temp_dir.path());

    let summary = run_once(&config).await;

    assert_eq!(summary.pages_visited, 3);
    assert_eq!(summary.listings_seen, 6);
    assert_eq!(summary.listings_written, 6);
    assert_eq!(summary.duplicates_skipped, 0);
    assert_eq!(
        summary.outcome,
        CrawlOutcome::Completed(TerminationReason::LastPage)
    );

    // Verify stored rows and their order
    let storage = SqliteStorage::open(&db_path).unwrap();
    let rows = storage
        .select(&Columns::named(["Address", "City", "State", "Price"]), "", &[])
        .unwrap();
    assert_eq!(rows.len(), 6);
    let first: Vec<String> = rows[0].iter().map(cell_to_string).collect();
    assert_eq!(first, vec!["1 Olive Ave", "Fresno", "CA", "$350,000"]);
    assert_eq!(cell_to_string(&rows[5][0]), "6 Kings Canyon Rd");

    let run = storage.get_run(summary.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.pages_visited, 3);
    assert_eq!(run.listings_written, 6);
    assert_eq!(run.config_hash, "test-hash");
}

#[tokio::test]
async fn test_recrawl_stores_no_duplicates() {
    let mock_server = MockServer::start().await;
    mount_three_pages(&mock_server, 2).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("homes.db");
    let config = create_test_config(&mock_server.uri(), &db_path, temp_dir.path());

    let first = run_once(&config).await;
    let second = run_once(&config).await;

    assert_eq!(first.listings_written, 6);
    assert_eq!(second.listings_seen, 6);
    assert_eq!(second.listings_written, 0);
    assert_eq!(second.duplicates_skipped, 6);

    let storage = SqliteStorage::open(&db_path).unwrap();
    assert_eq!(storage.count_listings().unwrap(), 6);
    assert_eq!(
        storage.get_latest_run().unwrap().map(|r| r.id),
        Some(second.run_id)
    );
}

#[tokio::test]
async fn test_page_without_data_ends_crawl() {
    let mock_server = MockServer::start().await;

    // Has a next link but no embedded data; the link must not be followed
    mount_page(
        &mock_server,
        "/CA/Fresno",
        r#"<html><body>
            <nav aria-label="search results pagination"><ul>
              <li data-testid="pagination-next-page"><a href="/CA/Fresno/2_p/">Next</a></li>
            </ul></nav>
        </body></html>"#
            .to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/CA/Fresno/2_p/", search_page(&[], None), 0).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("homes.db");
    let config = create_test_config(&mock_server.uri(), &db_path, temp_dir.path());

    let summary = run_once(&config).await;

    assert_eq!(
        summary.outcome,
        CrawlOutcome::Completed(TerminationReason::NoHomes)
    );
    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.listings_seen, 0);
}

#[tokio::test]
async fn test_http_error_aborts_and_keeps_earlier_pages() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/CA/Fresno",
        search_page(
            &[home_json(1, "Olive Ave", "Fresno")],
            Some("/CA/Fresno/2_p/"),
        ),
        1,
    )
    .await;

    // Non-success statuses are not retried
    Mock::given(method("GET"))
        .and(path("/CA/Fresno/2_p/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("homes.db");
    let config = create_test_config(&mock_server.uri(), &db_path, temp_dir.path());

    let summary = run_once(&config).await;

    match &summary.outcome {
        CrawlOutcome::Aborted { url, attempts, .. } => {
            assert!(url.ends_with("/CA/Fresno/2_p/"));
            assert_eq!(*attempts, 1);
        }
        other => panic!("expected abort, got {:?}", other),
    }
    assert_eq!(summary.pages_visited, 1);

    let storage = SqliteStorage::open(&db_path).unwrap();
    assert_eq!(storage.count_listings().unwrap(), 1);
    let run = storage.get_run(summary.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Aborted);
    assert!(run.error_message.unwrap().contains("500"));
}

#[tokio::test]
async fn test_unreachable_site_gives_up_after_retries() {
    // Reserve a port, then free it so connections are refused
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("homes.db");
    let config = create_test_config(
        &format!("http://127.0.0.1:{}", port),
        &db_path,
        temp_dir.path(),
    );

    let summary = run_once(&config).await;

    match &summary.outcome {
        CrawlOutcome::Aborted { attempts, .. } => assert_eq!(*attempts, 6),
        other => panic!("expected abort, got {:?}", other),
    }
    assert_eq!(summary.pages_visited, 0);

    let storage = SqliteStorage::open(&db_path).unwrap();
    assert_eq!(storage.count_listings().unwrap(), 0);
}

#[tokio::test]
async fn test_browser_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/CA/Fresno"))
        .and(header("accept-language", "en-US;en;q=0.9"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(search_page(&[home_json(1, "Olive Ave", "Fresno")], None)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("homes.db");
    let config = create_test_config(&mock_server.uri(), &db_path, temp_dir.path());

    let summary = run_once(&config).await;

    assert_eq!(summary.listings_written, 1);
}

#[tokio::test]
async fn test_deflate_encoded_page_is_decoded() {
    let mock_server = MockServer::start().await;

    let body = search_page(&[home_json(1, "Olive Ave", "Fresno")], None);
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body.as_bytes()).unwrap();
    let compressed = encoder.finish().unwrap();

    Mock::given(method("GET"))
        .and(path("/CA/Fresno"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(compressed, "text/html")
                .insert_header("content-encoding", "deflate"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("homes.db");
    let config = create_test_config(&mock_server.uri(), &db_path, temp_dir.path());

    let summary = run_once(&config).await;

    assert_eq!(
        summary.outcome,
        CrawlOutcome::Completed(TerminationReason::LastPage)
    );
    assert_eq!(summary.listings_written, 1);
}

#[tokio::test]
async fn test_page_limit_stops_early() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/CA/Fresno",
        search_page(
            &[home_json(1, "Olive Ave", "Fresno")],
            Some("/CA/Fresno/2_p/"),
        ),
        1,
    )
    .await;
    mount_page(&mock_server, "/CA/Fresno/2_p/", search_page(&[], None), 0).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("homes.db");
    let mut config = create_test_config(&mock_server.uri(), &db_path, temp_dir.path());
    config.crawler.max_pages = 1;

    let summary = run_once(&config).await;

    assert_eq!(
        summary.outcome,
        CrawlOutcome::Completed(TerminationReason::PageLimit)
    );
}

#[tokio::test]
async fn test_crawl_then_export() {
    let mock_server = MockServer::start().await;
    mount_three_pages(&mock_server, 1).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("homes.db");
    let config = create_test_config(&mock_server.uri(), &db_path, temp_dir.path());

    run_once(&config).await;

    let storage = SqliteStorage::open(&db_path).unwrap();

    // City export
    let export = export_to_csv(&storage, "Fresno", "CA", temp_dir.path()).unwrap();
    assert_eq!(export.rows, 6);
    assert!(matches!(export.scope, ExportScope::City { .. }));
    let content = std::fs::read_to_string(&export.path).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("Address,State,City,Zip_Code,Link,Description,Beds,Baths,Sqft,Price,Front_Pic,Available,Score")
    );
    assert_eq!(lines.count(), 6);

    // Unknown city falls back to the whole state
    let fallback = export_to_csv(&storage, "Nowhere", "CA", temp_dir.path()).unwrap();
    assert_eq!(fallback.rows, 6);
    assert_eq!(
        fallback.scope,
        ExportScope::State {
            state: "CA".to_string()
        }
    );
    assert!(fallback
        .path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("CA_homes_"));
}
