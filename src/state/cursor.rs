use crate::HarvestError;

/// Tracks how far a crawl has walked through the paginated results
///
/// Owned by the coordinator. Once [`CrawlCursor::terminate`] has been called
/// the cursor stays terminal and refuses to advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlCursor {
    base_url: String,
    current_url: String,
    page: u32,
    terminal: bool,
}

impl CrawlCursor {
    /// Creates a cursor positioned at page 1 of `start_url`
    pub fn new(base_url: impl Into<String>, start_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            current_url: start_url.into(),
            page: 1,
            terminal: false,
        }
    }

    /// Creates a cursor at the first search page for a city
    ///
    /// The URL layout is `{base_url}/{state}/{city}`.
    pub fn for_city(base_url: &str, city: &str, state: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let start = format!("{}/{}/{}", base, state, city);
        Self::new(base, start)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the page that will be (or was just) fetched
    pub fn current_url(&self) -> &str {
        &self.current_url
    }

    /// 1-based page number of the current URL
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Moves to the next page
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::CursorTerminal` if the cursor already terminated.
    pub fn advance(&mut self, next_url: impl Into<String>) -> Result<(), HarvestError> {
        let next_url = next_url.into();
        if self.terminal {
            return Err(HarvestError::CursorTerminal { url: next_url });
        }

        self.current_url = next_url;
        self.page += 1;
        Ok(())
    }

    /// Marks the crawl finished; irreversible
    pub fn terminate(&mut self) {
        self.terminal = true;
    }
}
