//! Search page parser
//!
//! This module handles parsing a fetched search page to extract:
//! - The embedded `__NEXT_DATA__` JSON and its `props.searchData.homes` array
//! - The "next page" link from the pagination navigation

use scraper::{Html, Selector};
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Why a page yielded no listing data
///
/// None of these stop a crawl with an error; the page is treated as having
/// no homes and the run ends.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("no __NEXT_DATA__ script found")]
    MissingScript,

    #[error("embedded data is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("embedded data has no props.searchData.homes array")]
    MissingHomes,
}

/// The raw homes of one page, exactly as the site sent them
pub type RawListingsPayload = Vec<Value>;

/// Everything the crawl loop needs from one page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// Raw homes, or the reason there are none
    pub payload: Result<RawListingsPayload, PayloadError>,

    /// Absolute URL of the next page, if the page links to one
    pub next_page: Option<String>,
}

/// Parses a search page once and extracts both the payload and the next link
///
/// # Example
///
/// ```
/// use homes_harvest::crawler::parse_page;
/// use url::Url;
///
/// let html = r#"<html><body>
///   <script id="__NEXT_DATA__" type="application/json">
///     {"props":{"searchData":{"homes":[{"url":"/p/1"}]}}}
///   </script>
/// </body></html>"#;
/// let base_url = Url::parse("https://www.trulia.com").unwrap();
/// let parsed = parse_page(html, &base_url);
/// assert_eq!(parsed.payload.unwrap().len(), 1);
/// assert!(parsed.next_page.is_none());
/// ```
pub fn parse_page(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        payload: payload_from_document(&document),
        next_page: next_page_from_document(&document, base_url),
    }
}

/// Extracts the raw homes array from a page
pub fn extract_payload(html: &str) -> Result<RawListingsPayload, PayloadError> {
    payload_from_document(&Html::parse_document(html))
}

/// Finds the absolute URL of the next results page, if any
///
/// The link lives at `nav[aria-label="search results pagination"]` →
/// `li[data-testid="pagination-next-page"]` → `a[href]`. A missing control
/// means the current page is the last one.
pub fn extract_next_page_url(html: &str, base_url: &Url) -> Option<String> {
    next_page_from_document(&Html::parse_document(html), base_url)
}

fn payload_from_document(document: &Html) -> Result<RawListingsPayload, PayloadError> {
    let selector = Selector::parse(r#"script[id="__NEXT_DATA__"]"#)
        .map_err(|_| PayloadError::MissingScript)?;

    let script = document
        .select(&selector)
        .next()
        .ok_or(PayloadError::MissingScript)?;

    let text: String = script.text().collect();
    let data: Value = serde_json::from_str(text.trim())
        .map_err(|e| PayloadError::InvalidJson(e.to_string()))?;

    match data.pointer("/props/searchData/homes") {
        Some(Value::Array(homes)) => Ok(homes.clone()),
        _ => Err(PayloadError::MissingHomes),
    }
}

fn next_page_from_document(document: &Html, base_url: &Url) -> Option<String> {
    let nav_selector = Selector::parse(r#"nav[aria-label="search results pagination"]"#).ok()?;
    let next_selector = Selector::parse(r#"li[data-testid="pagination-next-page"]"#).ok()?;
    let link_selector = Selector::parse("a[href]").ok()?;

    let nav = document.select(&nav_selector).next()?;
    let next = nav.select(&next_selector).next()?;
    let href = next.select(&link_selector).next()?.value().attr("href")?;

    resolve_link(href, base_url)
}

/// Resolves a pagination href to an absolute http(s) URL
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
