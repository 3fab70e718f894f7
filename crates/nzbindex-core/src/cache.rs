//! Paced refresh of the "recent posts" feed
//!
//! The cache pulls the newest posts with an unconstrained query. NZBIndex
//! asks clients to poll this feed rarely, so refreshes are gated by their own
//! long interval, independent of search pacing. A refresh that is not due yet
//! returns immediately instead of waiting.

use tracing::{debug, error, info};

use crate::client::{FeedFetcher, RateLimiter};
use crate::config::ProviderConfig;
use crate::parser::parse_feed;
use crate::query::{SearchQuery, SortOrder};
use crate::types::RawResultItem;

/// Last successfully fetched "recent posts" document and its refresh pacing
#[derive(Debug, Clone)]
pub struct FeedCache {
    pacing: RateLimiter,
    query: SearchQuery,
    data: Option<Vec<u8>>,
}

impl FeedCache {
    /// Create an empty cache configured from `config`
    pub fn new(config: &ProviderConfig) -> Self {
        let query = SearchQuery::new("", false)
            .with_max_results(config.cache_max_results)
            .with_min_size(config.min_size)
            .with_sort(SortOrder::AgeDesc);

        Self {
            pacing: RateLimiter::new(config.cache_interval()),
            query,
            data: None,
        }
    }

    /// Whether enough time has passed since the last refresh attempt
    pub fn is_due(&self) -> bool {
        self.pacing.is_ready()
    }

    /// Bytes of the last successful refresh
    pub fn cached(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Parse the cached document into raw items
    ///
    /// Returns an empty list when nothing is cached or the cached document
    /// no longer parses.
    pub fn cached_items(&self) -> Vec<RawResultItem> {
        let Some(data) = self.data.as_deref() else {
            return Vec::new();
        };

        match parse_feed(data) {
            Ok(items) => items,
            Err(e) => {
                error!(error = %e, "Cached NZBIndex feed is unreadable");
                Vec::new()
            }
        }
    }

    /// Fetch the recent-posts feed if a refresh is due.
    ///
    /// The attempt counts against pacing whether or not it succeeds. On
    /// failure the previously cached document is kept.
    ///
    /// # Returns
    /// * `Some(bytes)` with the freshly fetched document
    /// * `None` if the refresh was not due or the fetch failed
    pub async fn refresh<F>(
        &mut self,
        fetcher: &F,
        base_url: &str,
        headers: &[(String, String)],
    ) -> Option<Vec<u8>>
    where
        F: FeedFetcher + ?Sized,
    {
        if !self.is_due() {
            debug!(
                remaining_secs = self.pacing.remaining().as_secs(),
                "NZBIndex cache refresh not due yet"
            );
            return None;
        }

        let url = self.query.to_url(base_url);
        debug!(url = %url, "NZBIndex cache update URL");

        let body = fetcher.fetch(&url, headers).await;
        self.pacing.mark();

        match body.filter(|b| !b.is_empty()) {
            Some(body) => {
                info!(bytes = body.len(), "NZBIndex cache refreshed");
                self.data = Some(body.clone());
                Some(body)
            }
            None => {
                info!("NZBIndex cache refresh returned nothing, keeping previous data");
                None
            }
        }
    }
}
