use serde::Deserialize;

/// Main configuration structure for Homes-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub headers: HeaderConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Site root; the first page is `{base-url}/{state}/{city}`
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Retries after the first failed attempt on connection-level failures
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Pause between retry attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Stop after this many pages; 0 means follow pagination to the end
    #[serde(rename = "max-pages", default)]
    pub max_pages: u32,
}

/// Browser-like request headers sent with every page request
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    pub accept: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    #[serde(rename = "accept-encoding")]
    pub accept_encoding: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Directory CSV exports are written into
    #[serde(rename = "export-dir", default = "default_export_dir")]
    pub export_dir: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            max_pages: 0,
        }
    }
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/96.0.4664.110 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,\
                     image/apng,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US;en;q=0.9".to_string(),
            accept_encoding: "gzip, deflate".to_string(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.trulia.com".to_string()
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_export_dir() -> String {
    ".".to_string()
}
