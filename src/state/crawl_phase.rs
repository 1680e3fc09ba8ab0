/// Crawl phase definitions for the page loop
///
/// Each page passes through the same four phases; `Terminal` ends the run.
use std::fmt;

/// Represents where the crawl loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Requesting the page at the cursor URL
    Fetching,

    /// Pulling the embedded listing data out of the fetched page
    Parsing,

    /// Extracting each raw home and writing it to the store
    ExtractingAndWriting,

    /// Looking for the next-page link on the current page
    DecidingNextPage,

    /// No further fetch will be issued
    Terminal,
}

impl CrawlPhase {
    /// Returns true if the loop has stopped
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }

    /// Returns true if `next` may follow this phase
    ///
    /// `Terminal` is reachable from fetching (fatal failure), parsing (no
    /// data) and deciding (no next page or page limit). Nothing leaves it.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Fetching, Self::Parsing)
                | (Self::Fetching, Self::Terminal)
                | (Self::Parsing, Self::ExtractingAndWriting)
                | (Self::Parsing, Self::Terminal)
                | (Self::ExtractingAndWriting, Self::DecidingNextPage)
                | (Self::DecidingNextPage, Self::Fetching)
                | (Self::DecidingNextPage, Self::Terminal)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::ExtractingAndWriting => "extracting_and_writing",
            Self::DecidingNextPage => "deciding_next_page",
            Self::Terminal => "terminal",
        }
    }

    /// Returns all phases in loop order
    pub fn all_phases() -> Vec<Self> {
        vec![
            Self::Fetching,
            Self::Parsing,
            Self::ExtractingAndWriting,
            Self::DecidingNextPage,
            Self::Terminal,
        ]
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
