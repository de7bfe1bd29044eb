/// Crawl phase definitions
///
/// A harvest moves through these phases in order; pages are visited strictly
/// one after another, so the page number only ever grows.
use std::fmt;

/// The current phase of a paged crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Inputs accepted, nothing requested yet
    Init,

    /// Probing page 1 for the total result count
    FetchingPageCount,

    /// Fetching the given search results page (1-based)
    FetchingPage(u32),

    /// Fetching the detail of a new listing found on the given page
    FetchingDetail { page: u32 },

    /// Crawl finished; collected records are final
    Done,
}

impl CrawlPhase {
    /// Returns true once the crawl has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Page currently being processed, if any
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::FetchingPage(n) | Self::FetchingDetail { page: n } => Some(*n),
            _ => None,
        }
    }

    /// Checks whether moving from this phase to `next` is allowed
    ///
    /// Any non-terminal phase may finish early (`Done`). Otherwise the crawl
    /// goes page count → page 1 → details of page 1 → page 2 → ...
    pub fn can_transition_to(&self, next: &Self) -> bool {
        use CrawlPhase::*;

        match (self, next) {
            (Done, _) => false,
            (_, Done) => true,
            (Init, FetchingPageCount) => true,
            (FetchingPageCount, FetchingPage(1)) => true,
            (FetchingPage(n), FetchingDetail { page }) => page == n,
            (FetchingPage(n), FetchingPage(m)) => *m == n + 1,
            (FetchingDetail { page: n }, FetchingDetail { page }) => page == n,
            (FetchingDetail { page: n }, FetchingPage(m)) => *m == n + 1,
            _ => false,
        }
    }

    /// Short name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::FetchingPageCount => "fetching_page_count",
            Self::FetchingPage(_) => "fetching_page",
            Self::FetchingDetail { .. } => "fetching_detail",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchingPage(n) => write!(f, "fetching_page({})", n),
            Self::FetchingDetail { page } => write!(f, "fetching_detail(page {})", page),
            other => f.write_str(other.as_str()),
        }
    }
}
