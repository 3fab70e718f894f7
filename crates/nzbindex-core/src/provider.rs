//! Main NZBIndex provider API
//!
//! This module combines pacing, fetching, feed parsing and title
//! reconciliation into the searches a scheduler runs. Every operation is
//! best-effort: network failures and malformed feeds produce fewer or no
//! results, never an error.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::cache::FeedCache;
use crate::client::{browser_headers, FeedFetcher, HttpFetcher, RateLimiter, ShutdownSignal};
use crate::config::ProviderConfig;
use crate::error::Result;
use crate::parser::{parse_feed, parse_pub_date, reconcile};
use crate::proper::{filter_propers, PROPER_QUERY};
use crate::query::SearchQuery;
use crate::tokens::TokenGenerator;
use crate::types::{
    EpisodeRef, ProperResult, RawResultItem, ResolvedResult, SearchTokens, ShowRef,
    INVALID_TITLE_SENTINEL,
};

/// Capabilities a scheduler needs from one search service
///
/// Implemented per service and composed by a poller; each method degrades to
/// an empty result instead of failing.
#[async_trait]
pub trait SearchProvider: Send {
    /// Display name of the service
    fn name(&self) -> &str;

    async fn find_episode(
        &mut self,
        episode: &EpisodeRef,
        generator: &dyn TokenGenerator,
    ) -> Vec<ResolvedResult>;

    async fn find_season(
        &mut self,
        show: &ShowRef,
        season: u32,
        generator: &dyn TokenGenerator,
    ) -> Vec<ResolvedResult>;

    async fn find_propers(&mut self, watermark: Option<DateTime<Utc>>) -> Vec<ProperResult>;

    /// Refresh the recent-posts cache, returning the new document if one was fetched
    async fn refresh(&mut self) -> Option<Vec<u8>>;
}

/// Search provider for NZBIndex
///
/// Owns its search pacing (10 seconds between queries by default) and its
/// recent-posts cache (25 minutes between refreshes). Query methods take
/// `&mut self`, so one instance never has two queries in flight.
///
/// # Example
/// ```no_run
/// use nzbindex_core::{NzbIndexProvider, SearchTokens};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut provider = NzbIndexProvider::new()?;
///
///     let tokens = SearchTokens::new(["Show.Name.S01E02"]);
///     let results = provider.search("Show.Name.S01E02", false, &tokens).await;
///     println!("Found {} results", results.len());
///
///     Ok(())
/// }
/// ```
pub struct NzbIndexProvider<F = HttpFetcher> {
    fetcher: F,
    config: ProviderConfig,
    headers: Vec<(String, String)>,
    search_pacing: RateLimiter,
    cache: FeedCache,
    shutdown: ShutdownSignal,
}

impl NzbIndexProvider<HttpFetcher> {
    /// Create a provider with default configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> Result<Self> {
        Self::with_config(ProviderConfig::default())
    }

    /// Create a provider with custom configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_config(config: ProviderConfig) -> Result<Self> {
        let fetcher = HttpFetcher::with_config(&config)?;
        Ok(Self::with_fetcher(fetcher, config))
    }
}

impl<F: FeedFetcher> NzbIndexProvider<F> {
    /// Create a provider around a custom fetcher.
    ///
    /// This is useful for testing or for routing requests through a shared
    /// client.
    pub fn with_fetcher(fetcher: F, config: ProviderConfig) -> Self {
        Self {
            fetcher,
            headers: browser_headers(&config.user_agent),
            search_pacing: RateLimiter::new(config.search_interval()),
            cache: FeedCache::new(&config),
            shutdown: ShutdownSignal::never(),
            config,
        }
    }

    /// Abort pacing waits when `shutdown` fires.
    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn cache(&self) -> &FeedCache {
        &self.cache
    }

    /// Run one search and reconcile its results against `tokens`.
    ///
    /// # Arguments
    /// * `query_text` - Search text
    /// * `quoted` - Wrap the text in double quotes for an exact-phrase search
    /// * `tokens` - Tokens the caller expects in result titles
    ///
    /// # Returns
    /// Usable results in feed order; empty when the request fails or the
    /// response is not a well-formed feed.
    pub async fn search(
        &mut self,
        query_text: &str,
        quoted: bool,
        tokens: &SearchTokens,
    ) -> Vec<ResolvedResult> {
        let query = SearchQuery::new(query_text, quoted)
            .with_max_results(self.config.max_results)
            .with_min_size(self.config.min_size);

        let items = self.fetch_items(&query).await;
        resolve_items(items, tokens)
    }

    /// Search every token generated for `episode`, merging results by url.
    pub async fn find_episode<G>(&mut self, episode: &EpisodeRef, generator: &G) -> Vec<ResolvedResult>
    where
        G: TokenGenerator + ?Sized,
    {
        let tokens = generator.tokens_for_episode(episode);
        self.search_all(&tokens).await
    }

    /// Search every token generated for a whole season, merging results by url.
    pub async fn find_season<G>(
        &mut self,
        show: &ShowRef,
        season: u32,
        generator: &G,
    ) -> Vec<ResolvedResult>
    where
        G: TokenGenerator + ?Sized,
    {
        let tokens = generator.tokens_for_season(show, season);
        self.search_all(&tokens).await
    }

    /// Find proper/repack releases published after `watermark`.
    pub async fn find_propers(&mut self, watermark: Option<DateTime<Utc>>) -> Vec<ProperResult> {
        let query = SearchQuery::new(PROPER_QUERY, false)
            .with_max_results(self.config.max_results)
            .with_min_size(self.config.min_size);

        let items = self
            .fetch_items(&query)
            .await
            .into_iter()
            .filter(|item| is_usable(&item.title, &item.link))
            .collect();

        let propers = filter_propers(items, watermark);
        info!(count = propers.len(), "Found proper/repack candidates");
        propers
    }

    /// Refresh the recent-posts cache if its interval has elapsed.
    pub async fn refresh_cache(&mut self) -> Option<Vec<u8>> {
        if self.shutdown.is_triggered() {
            return None;
        }
        self.cache
            .refresh(&self.fetcher, &self.config.base_url, &self.headers)
            .await
    }

    async fn search_all(&mut self, tokens: &SearchTokens) -> Vec<ResolvedResult> {
        if tokens.is_empty() {
            warn!("No search tokens generated, skipping search");
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut results = Vec::new();
        for token in tokens {
            for result in self.search(token, false, tokens).await {
                if seen.insert(result.url.clone()) {
                    results.push(result);
                }
            }
        }
        results
    }

    /// Wait for pacing, fetch and parse; any failure yields no items.
    async fn fetch_items(&mut self, query: &SearchQuery) -> Vec<RawResultItem> {
        let url = query.to_url(&self.config.base_url);
        info!(url = %url, "Search URL");

        if let Err(e) = self.search_pacing.wait_or_cancel(&self.shutdown).await {
            info!(error = %e, "Search abandoned before sending");
            return Vec::new();
        }

        let body = self.fetcher.fetch(&url, &self.headers).await;
        self.search_pacing.mark();

        let Some(body) = body.filter(|b| !b.is_empty()) else {
            debug!(url = %url, "No response from NZBIndex");
            return Vec::new();
        };

        match parse_feed(&body) {
            Ok(items) => items,
            Err(e) => {
                error!(error = %e, "Error trying to load NZBIndex RSS feed");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl<F: FeedFetcher> SearchProvider for NzbIndexProvider<F> {
    fn name(&self) -> &str {
        "NZBIndex"
    }

    async fn find_episode(
        &mut self,
        episode: &EpisodeRef,
        generator: &dyn TokenGenerator,
    ) -> Vec<ResolvedResult> {
        NzbIndexProvider::find_episode(self, episode, generator).await
    }

    async fn find_season(
        &mut self,
        show: &ShowRef,
        season: u32,
        generator: &dyn TokenGenerator,
    ) -> Vec<ResolvedResult> {
        NzbIndexProvider::find_season(self, show, season, generator).await
    }

    async fn find_propers(&mut self, watermark: Option<DateTime<Utc>>) -> Vec<ProperResult> {
        NzbIndexProvider::find_propers(self, watermark).await
    }

    async fn refresh(&mut self) -> Option<Vec<u8>> {
        self.refresh_cache().await
    }
}

/// Both fields present and not marked invalid by the indexer
fn is_usable(title: &str, url: &str) -> bool {
    if title.is_empty() || url.is_empty() {
        error!(
            title,
            url, "The XML returned from the NZBIndex RSS feed is incomplete, this result is unusable"
        );
        return false;
    }
    title != INVALID_TITLE_SENTINEL
}

/// Reconcile titles and drop unusable records, keeping feed order
fn resolve_items(items: Vec<RawResultItem>, tokens: &SearchTokens) -> Vec<ResolvedResult> {
    items
        .into_iter()
        .filter_map(|item| {
            let title = reconcile(&item.title, tokens).into_title();
            if !is_usable(&title, &item.link) {
                return None;
            }

            let published = item
                .pub_date
                .as_deref()
                .and_then(|date| parse_pub_date(date).ok());

            Some(ResolvedResult {
                title,
                url: item.link,
                published,
            })
        })
        .collect()
}
