//! The typed listing record
//!
//! One `Listing` is built for every raw home found on a search page. Fields the
//! source omitted carry the [`UNKNOWN`] sentinel instead of failing.

use std::fmt;

/// Placeholder stored in place of any text field the source did not provide
pub const UNKNOWN: &str = "unknown";

/// A single real-estate listing
///
/// `address` and `link` are each unique in the store. Numeric-looking fields
/// (`beds`, `baths`, `sqft`, `price`) keep the display text the site sent,
/// e.g. `"3bd"` or `"1,850 sqft"`; they are not normalized to integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub address: String,
    pub city: String,
    /// Two-letter state code
    pub state: String,
    pub zip_code: String,
    /// Listing URL on the source site
    pub link: String,
    pub description: String,
    pub beds: String,
    pub baths: String,
    pub sqft: String,
    pub price: String,
    /// Primary (hero) image URL
    pub front_pic: String,
    /// `None` when the source did not say whether the home is for sale
    pub available: Option<bool>,
    /// Reserved for ranking; always 0 when harvested
    pub score: i64,
}

impl Listing {
    /// Creates a listing with only its two unique keys set
    ///
    /// Every other field holds the sentinel value.
    pub fn new(address: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            city: UNKNOWN.to_string(),
            state: UNKNOWN.to_string(),
            zip_code: UNKNOWN.to_string(),
            link: link.into(),
            description: UNKNOWN.to_string(),
            beds: UNKNOWN.to_string(),
            baths: UNKNOWN.to_string(),
            sqft: UNKNOWN.to_string(),
            price: UNKNOWN.to_string(),
            front_pic: UNKNOWN.to_string(),
            available: None,
            score: 0,
        }
    }

    /// Returns true if any field fell back to a sentinel
    pub fn is_partial(&self) -> bool {
        [
            &self.address,
            &self.city,
            &self.state,
            &self.zip_code,
            &self.link,
            &self.description,
            &self.beds,
            &self.baths,
            &self.sqft,
            &self.price,
            &self.front_pic,
        ]
        .iter()
        .any(|value| value.as_str() == UNKNOWN)
            || self.available.is_none()
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}
