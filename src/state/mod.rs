//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: Where a crawl is in its page count → pages → details sequence
//! - `CrawlState`: Seen identifiers, limit and collected records of one run

mod crawl_phase;
mod crawl_state;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use crawl_state::CrawlState;
