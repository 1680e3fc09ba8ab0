//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client and the browser-like header set
//! - A `Transport` seam that performs exactly one GET
//! - Retry logic for connection-level failures
//! - Error classification (transient vs fatal)

use crate::config::{CrawlerConfig, HeaderConfig};
use crate::ConfigError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// A fetched page
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Final URL after redirects
    pub url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Page body
    pub body: String,
}

/// Failure of a single request attempt
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// Returns true for connection-level failures worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Timeout(_))
    }
}

/// Result of a fetch operation
///
/// Transient failures never show up here; the fetcher retries them itself
/// and only reports `Fatal` once its retries are used up.
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success(PageContent),

    /// The page could not be fetched; the run must stop
    Fatal {
        /// Total requests issued, including the first
        attempts: u32,
        /// Error from the last attempt
        error: TransportError,
    },
}

/// Performs a single GET request
pub trait Transport {
    fn get(
        &self,
        url: &str,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<PageContent, TransportError>> + Send;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a transport with a client configured from `config`
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<PageContent, TransportError> {
        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(PageContent {
            url: final_url,
            status_code: status.as_u16(),
            body,
        })
    }
}

fn classify_error(e: reqwest::Error) -> TransportError {
    if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}

/// Builds an HTTP client with proper configuration
///
/// Identity headers are not set here; they travel with each request so the
/// same client works for any header set.
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
}

/// Builds the browser-like header set sent with every page request
pub fn build_headers(config: &HeaderConfig) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();

    for (name, value) in [
        (USER_AGENT, &config.user_agent),
        (ACCEPT, &config.accept),
        (ACCEPT_LANGUAGE, &config.accept_language),
        (ACCEPT_ENCODING, &config.accept_encoding),
    ] {
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            ConfigError::Validation(format!("Invalid value for header {}: {}", name, e))
        })?;
        headers.insert(name, header_value);
    }

    Ok(headers)
}

/// Fetches pages, retrying connection-level failures a bounded number of times
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Connection refused / reset | Retry, up to `max_retries` times |
/// | Timeout | Retry, up to `max_retries` times |
/// | Non-success HTTP status | Immediate → Fatal |
/// | Body read / other request error | Immediate → Fatal |
///
/// With `max_retries = 5` a page gets six attempts in total.
pub struct Fetcher<T> {
    transport: T,
    headers: HeaderMap,
    max_retries: u32,
    retry_delay: Duration,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, headers: HeaderMap, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            transport,
            headers,
            max_retries,
            retry_delay,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches `url`, reissuing the same request on transient failures
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let mut tries: u32 = 0;

        loop {
            let error = match self.transport.get(url, &self.headers).await {
                Ok(page) => return FetchResult::Success(page),
                Err(e) => e,
            };

            if !error.is_transient() {
                tracing::error!("Request for {} failed: {}", url, error);
                return FetchResult::Fatal {
                    attempts: tries + 1,
                    error,
                };
            }

            tries += 1;
            if tries > self.max_retries {
                tracing::error!(
                    "Request for {} failed after {} attempts. No data will be obtained on homes.",
                    url,
                    tries
                );
                return FetchResult::Fatal {
                    attempts: tries,
                    error,
                };
            }

            tracing::error!(
                "Unable to load page {}: {}. Tries remaining: {}",
                url,
                error,
                self.max_retries + 1 - tries
            );

            if !self.retry_delay.is_zero() {
                tokio::time::sleep(self.retry_delay).await;
            }
        }
    }
}
