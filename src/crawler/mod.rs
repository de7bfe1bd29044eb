//! Crawler module for incremental job harvesting
//!
//! This module contains the harvesting logic, including:
//! - The `JobScraper` entry point the binary drives
//! - The `JobSource` seam describing one job board's API
//! - The paged crawl loop shared by all sources
//! - Source lookup by website name

mod kariyernet;
mod paged;

pub use kariyernet::KariyerNet;
pub use paged::PagedCrawler;

use crate::config::Config;
use crate::http::ResilientClient;
use crate::job::JobRecord;
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Websites that can be harvested
pub const SOURCES: &[&str] = &[kariyernet::NAME];

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Total number of results across all pages, when reported
    pub total_count: Option<u64>,

    /// Listing identifiers on this page, newest first
    pub item_ids: Vec<String>,
}

/// Request shapes and response mapping of one job board
///
/// Implementations are pure: they build requests and decode responses but
/// never perform I/O themselves.
pub trait JobSource: Send + Sync {
    /// Source name stored on every record
    fn name(&self) -> &str;

    /// Paged search endpoint (POST)
    fn search_url(&self) -> &str;

    /// Results per search page
    fn page_size(&self) -> u32;

    /// JSON body requesting the given 1-based page
    fn search_body(&self, page: u32) -> serde_json::Value;

    /// Headers sent with every search request
    fn search_headers(&self) -> HeaderMap;

    /// Decodes a search response
    fn parse_search(&self, body: &str) -> Result<SearchPage, HarvestError>;

    /// Detail URL for a listing identifier
    fn detail_url(&self, id: &str) -> Result<String, HarvestError>;

    /// Normalizes a detail response into a record
    fn parse_detail(&self, id: &str, body: &str) -> Result<JobRecord, HarvestError>;

    /// Whether requests should go through the proxy pool
    fn proxied(&self) -> bool;
}

/// A harvester for one website
#[async_trait]
pub trait JobScraper: Send + Sync {
    fn name(&self) -> &str;

    /// Collects postings not in `seen_ids`, newest first
    ///
    /// # Arguments
    ///
    /// * `seen_ids` - Identifiers harvested by earlier runs
    /// * `limit` - Maximum number of records; `None` is unlimited
    async fn scrape(
        &self,
        seen_ids: HashSet<String>,
        limit: Option<usize>,
    ) -> Result<Vec<JobRecord>, HarvestError>;
}

/// Builds the scraper for a website name
///
/// # Returns
///
/// * `Ok(Box<dyn JobScraper>)` - Scraper sharing `client`
/// * `Err(HarvestError::UnknownSource)` - No source of that name
pub fn build_scraper(
    website: &str,
    config: &Config,
    client: Arc<ResilientClient>,
) -> Result<Box<dyn JobScraper>, HarvestError> {
    let delay = Duration::from_millis(config.crawler.navigation_delay);

    match website {
        kariyernet::NAME => Ok(Box::new(PagedCrawler::new(
            KariyerNet::new(config.kariyernet.clone()),
            client,
            delay,
        ))),
        other => Err(HarvestError::UnknownSource(other.to_string())),
    }
}
