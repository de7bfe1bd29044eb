use crate::job::JobRecord;
use crate::state::CrawlPhase;
use crate::HarvestError;
use std::collections::HashSet;

/// Ephemeral state of a single crawl invocation
///
/// `seen_ids` starts as the caller's set of previously harvested identifiers
/// and only ever grows. Nothing here is persisted.
#[derive(Debug, Clone)]
pub struct CrawlState {
    phase: CrawlPhase,

    /// Identifiers already harvested or encountered during this run
    seen_ids: HashSet<String>,

    /// Maximum number of records to collect; `None` is unlimited
    limit: Option<usize>,

    /// Records collected so far, in discovery order
    collected: Vec<JobRecord>,

    /// Listings whose detail could not be fetched or normalized
    skipped_details: usize,
}

impl CrawlState {
    /// Creates the state for a new crawl
    pub fn new(seen_ids: HashSet<String>, limit: Option<usize>) -> Self {
        Self {
            phase: CrawlPhase::Init,
            seen_ids,
            limit,
            collected: Vec::new(),
            skipped_details: 0,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Moves to the next phase
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Transition recorded
    /// * `Err(HarvestError::InvalidTransition)` - The move breaks crawl ordering
    pub fn advance(&mut self, next: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(&next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    pub fn is_seen(&self, id: &str) -> bool {
        self.seen_ids.contains(id)
    }

    /// Records an identifier as seen
    ///
    /// Returns true if the identifier was new.
    pub fn mark_seen(&mut self, id: &str) -> bool {
        self.seen_ids.insert(id.to_string())
    }

    pub fn seen_count(&self) -> usize {
        self.seen_ids.len()
    }

    /// Appends a harvested record
    pub fn collect(&mut self, record: JobRecord) {
        self.collected.push(record);
    }

    pub fn collected_count(&self) -> usize {
        self.collected.len()
    }

    /// Returns true once the collection limit has been reached
    pub fn limit_reached(&self) -> bool {
        self.limit
            .map(|limit| self.collected.len() >= limit)
            .unwrap_or(false)
    }

    pub fn record_skipped_detail(&mut self) {
        self.skipped_details += 1;
    }

    pub fn skipped_details(&self) -> usize {
        self.skipped_details
    }

    /// Finishes the crawl and hands back the collected records
    pub fn into_collected(self) -> Vec<JobRecord> {
        self.collected
    }
}
