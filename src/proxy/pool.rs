//! Refreshable proxy pool
//!
//! The pool caches the provider's endpoint list, refreshes it when it is empty
//! or older than the refresh interval, and hands out endpoints at random.

use crate::proxy::{ProviderRecord, ProxyEndpoint, ProxyProvider};
use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use std::time::Duration;
use tokio::sync::Mutex;

/// Result of a refresh attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The interval since the last attempt has not elapsed; nothing was fetched
    Throttled,

    /// The pool was replaced with this many endpoints
    Refreshed { endpoints: usize },

    /// The provider call failed; the previous endpoints were kept
    Failed,
}

#[derive(Debug, Default)]
struct PoolState {
    endpoints: Vec<ProxyEndpoint>,

    /// Start time of the last refresh attempt, successful or not
    last_refresh: Option<DateTime<Utc>>,
}

impl PoolState {
    fn interval_elapsed(&self, interval: Duration, now: DateTime<Utc>) -> bool {
        match self.last_refresh {
            None => true,
            Some(last) => (now - last)
                .to_std()
                .map(|age| age >= interval)
                .unwrap_or(false),
        }
    }
}

/// A pool of proxy endpoints obtained from a [`ProxyProvider`]
///
/// The check-then-refresh sequence runs under a single async mutex, so a pool
/// shared between tasks (behind an `Arc`) never refreshes twice at once.
pub struct ProxyPool {
    provider: Box<dyn ProxyProvider>,
    max_size: u32,
    refresh_interval: Duration,
    state: Mutex<PoolState>,
}

impl ProxyPool {
    /// Creates an empty pool
    ///
    /// # Arguments
    ///
    /// * `provider` - Where endpoints come from
    /// * `max_size` - Maximum number of endpoints requested per refresh
    /// * `refresh_interval` - Minimum time between refresh attempts
    pub fn new(
        provider: impl ProxyProvider + 'static,
        max_size: u32,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            provider: Box::new(provider),
            max_size,
            refresh_interval,
            state: Mutex::new(PoolState::default()),
        }
    }

    /// Returns a random endpoint, refreshing first if the pool is empty or stale
    ///
    /// `None` means no usable endpoint exists right now and the caller should
    /// go direct.
    pub async fn acquire(&self) -> Option<ProxyEndpoint> {
        let mut state = self.state.lock().await;

        if state.endpoints.is_empty() || state.interval_elapsed(self.refresh_interval, Utc::now())
        {
            self.refresh_locked(&mut state).await;
        }

        pick(&state.endpoints)
    }

    /// Replaces the pool with a fresh provider list
    ///
    /// Skipped when the refresh interval has not elapsed since the last
    /// attempt, even if the pool is empty.
    pub async fn refresh(&self) -> RefreshOutcome {
        let mut state = self.state.lock().await;
        self.refresh_locked(&mut state).await
    }

    /// Number of cached endpoints
    pub async fn len(&self) -> usize {
        self.state.lock().await.endpoints.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.endpoints.is_empty()
    }

    /// Start time of the last refresh attempt
    pub async fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.last_refresh
    }

    async fn refresh_locked(&self, state: &mut PoolState) -> RefreshOutcome {
        let started = Utc::now();

        if !state.interval_elapsed(self.refresh_interval, started) {
            tracing::debug!(
                "Skipping proxy refresh, last attempt at {:?}",
                state.last_refresh
            );
            return RefreshOutcome::Throttled;
        }

        // Set on every attempt, success or failure.
        state.last_refresh = Some(started);

        match self.provider.fetch(self.max_size).await {
            Ok(records) => {
                state.endpoints = build_endpoints(records, self.max_size as usize);
                tracing::info!("Proxy pool refreshed with {} endpoints", state.endpoints.len());
                RefreshOutcome::Refreshed {
                    endpoints: state.endpoints.len(),
                }
            }
            Err(e) => {
                tracing::error!(
                    "Error fetching proxies: {} (keeping {} cached endpoints)",
                    e,
                    state.endpoints.len()
                );
                RefreshOutcome::Failed
            }
        }
    }
}

/// Keeps valid, complete records, in provider order
fn build_endpoints(records: Vec<ProviderRecord>, max_size: usize) -> Vec<ProxyEndpoint> {
    records
        .into_iter()
        .filter(|r| r.valid)
        .filter_map(|r| match ProxyEndpoint::try_from(r) {
            Ok(endpoint) => Some(endpoint),
            Err(e) => {
                tracing::warn!("Dropping proxy record: {}", e);
                None
            }
        })
        .take(max_size)
        .collect()
}

fn pick(endpoints: &[ProxyEndpoint]) -> Option<ProxyEndpoint> {
    endpoints.choose(&mut rand::rng()).cloned()
}
