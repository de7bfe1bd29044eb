//! Paged crawl driver
//!
//! This module contains the crawl loop shared by every paged source:
//! - Probing page 1 for the total result count
//! - Walking result pages newest-first, one at a time
//! - Skipping listings already seen and fetching detail for new ones
//! - Stopping at the collection limit or at the first page with nothing new

use crate::crawler::{JobScraper, JobSource, SearchPage};
use crate::http::{FetchResult, ResilientClient};
use crate::job::JobRecord;
use crate::state::{CrawlPhase, CrawlState};
use crate::HarvestError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// How processing of one results page ended
#[derive(Debug, Clone, PartialEq, Eq)]
enum PageOutcome {
    /// Every listing on the page was handled
    Completed { new_items: usize },

    /// The collection limit was hit partway through the page
    LimitReached,

    /// The page itself could not be fetched or read
    Failed(String),
}

/// Crawler for sources exposing a paged, newest-first search API
pub struct PagedCrawler<S> {
    source: S,
    client: Arc<ResilientClient>,
    navigation_delay: Duration,
}

impl<S: JobSource> PagedCrawler<S> {
    /// Creates a crawler
    ///
    /// # Arguments
    ///
    /// * `source` - Endpoints and field mapping of the job board
    /// * `client` - Shared HTTP client (and through it, the proxy pool)
    /// * `navigation_delay` - Pause before each results page
    pub fn new(source: S, client: Arc<ResilientClient>, navigation_delay: Duration) -> Self {
        Self {
            source,
            client,
            navigation_delay,
        }
    }

    /// Runs one crawl
    ///
    /// # Arguments
    ///
    /// * `seen_ids` - Identifiers harvested by earlier runs
    /// * `limit` - Maximum number of new records; `None` is unlimited
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<JobRecord>)` - New records, newest first (possibly empty)
    /// * `Err(HarvestError::PageCount)` - The total result count could not be read
    pub async fn run(
        &self,
        seen_ids: HashSet<String>,
        limit: Option<usize>,
    ) -> Result<Vec<JobRecord>, HarvestError> {
        let mut state = CrawlState::new(seen_ids, limit);

        if state.limit_reached() {
            tracing::info!("Limit is 0, nothing to collect from {}", self.source.name());
            state.advance(CrawlPhase::Done)?;
            return Ok(state.into_collected());
        }

        state.advance(CrawlPhase::FetchingPageCount)?;
        let last_page = self.fetch_page_count().await?;
        tracing::info!(
            "{}: {} result pages, {} known ids",
            self.source.name(),
            last_page,
            state.seen_count()
        );

        for page in 1..=last_page {
            state.advance(CrawlPhase::FetchingPage(page))?;

            if !self.navigation_delay.is_zero() {
                tokio::time::sleep(self.navigation_delay).await;
            }

            match self.process_page(&mut state, page).await? {
                PageOutcome::Completed { new_items: 0 } => {
                    tracing::info!("Page {} had no new jobs, caught up with earlier runs", page);
                    break;
                }
                PageOutcome::Completed { new_items } => {
                    tracing::debug!(
                        "Page {}/{}: {} new, {} collected",
                        page,
                        last_page,
                        new_items,
                        state.collected_count()
                    );
                }
                PageOutcome::LimitReached => {
                    tracing::info!(
                        "Reached limit of {} jobs on page {}",
                        state.collected_count(),
                        page
                    );
                    break;
                }
                PageOutcome::Failed(reason) => {
                    tracing::error!(
                        "Search page {} failed ({}); returning partial result of {} jobs",
                        page,
                        reason,
                        state.collected_count()
                    );
                    break;
                }
            }
        }

        state.advance(CrawlPhase::Done)?;

        if state.skipped_details() > 0 {
            tracing::warn!(
                "{} listings skipped because their detail could not be fetched",
                state.skipped_details()
            );
        }
        tracing::info!(
            "{}: crawl finished with {} new jobs",
            self.source.name(),
            state.collected_count()
        );

        Ok(state.into_collected())
    }

    /// Reads the total count from page 1 and derives the number of result pages
    async fn fetch_page_count(&self) -> Result<u32, HarvestError> {
        let url = self.source.search_url();
        let page_count_error = |reason: String| HarvestError::PageCount {
            url: url.to_string(),
            reason,
        };

        let body = self.fetch_search(1).await.map_err(page_count_error)?;
        let page = self
            .source
            .parse_search(&body)
            .map_err(|e| page_count_error(e.to_string()))?;
        let total = page
            .total_count
            .ok_or_else(|| page_count_error("response has no total count".to_string()))?;

        Ok(last_page(total, self.source.page_size()))
    }

    async fn fetch_search(&self, page: u32) -> Result<String, String> {
        let result = self
            .client
            .post(
                self.source.search_url(),
                &self.source.search_body(page),
                &self.source.search_headers(),
                self.source.proxied(),
            )
            .await;

        success_body(result)
    }

    async fn process_page(
        &self,
        state: &mut CrawlState,
        page: u32,
    ) -> Result<PageOutcome, HarvestError> {
        let results: SearchPage = match self.fetch_search(page).await {
            Ok(body) => match self.source.parse_search(&body) {
                Ok(results) => results,
                Err(e) => return Ok(PageOutcome::Failed(e.to_string())),
            },
            Err(reason) => return Ok(PageOutcome::Failed(reason)),
        };

        let mut new_items = 0;

        for id in &results.item_ids {
            if !state.mark_seen(id) {
                tracing::trace!("Skipping known job {}", id);
                continue;
            }
            new_items += 1;

            state.advance(CrawlPhase::FetchingDetail { page })?;
            match self.fetch_detail(id).await {
                Some(record) => state.collect(record),
                None => state.record_skipped_detail(),
            }

            if state.limit_reached() {
                return Ok(PageOutcome::LimitReached);
            }
        }

        Ok(PageOutcome::Completed { new_items })
    }

    /// Fetches and normalizes one listing; failures skip the listing
    async fn fetch_detail(&self, id: &str) -> Option<JobRecord> {
        let url = match self.source.detail_url(id) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Skipping job {}: {}", id, e);
                return None;
            }
        };

        let body = match success_body(self.client.get(&url, self.source.proxied()).await) {
            Ok(body) => body,
            Err(reason) => {
                tracing::warn!("Skipping job {}: detail fetch failed ({})", id, reason);
                return None;
            }
        };

        match self.source.parse_detail(id, &body) {
            Ok(record) => {
                tracing::debug!("Collected job {}: {}", id, record.title);
                Some(record)
            }
            Err(e) => {
                tracing::warn!("Skipping job {}: {}", id, e);
                None
            }
        }
    }
}

#[async_trait]
impl<S: JobSource> JobScraper for PagedCrawler<S> {
    fn name(&self) -> &str {
        self.source.name()
    }

    async fn scrape(
        &self,
        seen_ids: HashSet<String>,
        limit: Option<usize>,
    ) -> Result<Vec<JobRecord>, HarvestError> {
        self.run(seen_ids, limit).await
    }
}

/// Returns the body of a 2xx response, or a failure description
fn success_body(result: FetchResult) -> Result<String, String> {
    match result {
        FetchResult::Success {
            status_code, body, ..
        } if (200..300).contains(&status_code) => Ok(body),
        FetchResult::Success { status_code, .. } => Err(format!("HTTP {}", status_code)),
        failure => Err(failure
            .failure_reason()
            .unwrap_or_else(|| "request failed".to_string())),
    }
}

/// Number of pages needed for `total` results at `page_size` per page
fn last_page(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}
