//! Scheduled polling over a set of search providers
//!
//! The poller owns its providers and drives them strictly one at a time:
//! each cycle refreshes every provider's cache, searches the watchlist and
//! looks for proper/repack releases newer than the last one seen.

use std::time::Duration;

use chrono::{DateTime, Utc};
use nzbindex_core::{
    EpisodeRef, ProperResult, ResolvedResult, SearchProvider, ShutdownSignal, TokenGenerator,
};
use serde::Serialize;
use tokio::time::Instant;
use tracing::info;

use crate::config::WatchEntry;

/// Outcome of one cycle for one provider
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProviderReport {
    pub provider: String,
    /// Whether the recent-posts cache was refreshed this cycle
    pub cache_refreshed: bool,
    pub results: Vec<ResolvedResult>,
    pub propers: Vec<ProperResult>,
}

/// Outcome of one poll cycle
#[derive(Debug, Clone, Serialize)]
pub struct PollReport {
    pub started_at: DateTime<Utc>,
    pub providers: Vec<ProviderReport>,
    /// Set when the cycle stopped early because of shutdown
    pub interrupted: bool,
}

impl PollReport {
    pub fn result_count(&self) -> usize {
        self.providers.iter().map(|p| p.results.len()).sum()
    }

    pub fn proper_count(&self) -> usize {
        self.providers.iter().map(|p| p.propers.len()).sum()
    }
}

/// Drives a list of providers through repeated poll cycles
pub struct Poller {
    providers: Vec<Box<dyn SearchProvider>>,
    generator: Box<dyn TokenGenerator>,
    watchlist: Vec<WatchEntry>,
    propers: bool,
    /// Newest proper publish date seen so far
    proper_watermark: Option<DateTime<Utc>>,
    shutdown: ShutdownSignal,
}

impl Poller {
    pub fn new(generator: Box<dyn TokenGenerator>, watchlist: Vec<WatchEntry>) -> Self {
        Self {
            providers: Vec::new(),
            generator,
            watchlist,
            propers: true,
            proper_watermark: None,
            shutdown: ShutdownSignal::never(),
        }
    }

    pub fn add_provider<P: SearchProvider + 'static>(&mut self, provider: P) {
        self.providers.push(Box::new(provider));
    }

    pub fn with_propers(mut self, enabled: bool) -> Self {
        self.propers = enabled;
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Start proper searches from a previously persisted watermark
    pub fn with_proper_watermark(mut self, watermark: Option<DateTime<Utc>>) -> Self {
        self.proper_watermark = watermark;
        self
    }

    pub fn proper_watermark(&self) -> Option<DateTime<Utc>> {
        self.proper_watermark
    }

    /// Run one cycle over every provider.
    pub async fn run_cycle(&mut self) -> PollReport {
        let mut report = PollReport {
            started_at: Utc::now(),
            providers: Vec::with_capacity(self.providers.len()),
            interrupted: false,
        };
        let mut newest = self.proper_watermark;

        for provider in self.providers.iter_mut() {
            if self.shutdown.is_triggered() {
                report.interrupted = true;
                break;
            }

            let mut entry = ProviderReport {
                provider: provider.name().to_string(),
                cache_refreshed: provider.refresh().await.is_some(),
                ..ProviderReport::default()
            };

            for watch in &self.watchlist {
                let found = match watch.episode {
                    Some(episode) => {
                        let episode = EpisodeRef {
                            show: watch.show.clone(),
                            season: watch.season,
                            episode,
                        };
                        provider.find_episode(&episode, self.generator.as_ref()).await
                    }
                    None => {
                        provider
                            .find_season(&watch.show, watch.season, self.generator.as_ref())
                            .await
                    }
                };
                entry.results.extend(found);
            }

            if self.propers {
                entry.propers = provider.find_propers(self.proper_watermark).await;
                if let Some(latest) = entry.propers.iter().map(|p| p.published).max() {
                    newest = newest.max(Some(latest));
                }
            }

            info!(
                provider = %entry.provider,
                results = entry.results.len(),
                propers = entry.propers.len(),
                cache_refreshed = entry.cache_refreshed,
                "Provider poll finished"
            );
            report.providers.push(entry);
        }

        self.proper_watermark = newest;
        report
    }

    /// Run cycles every `interval` until shutdown is requested.
    ///
    /// `interval` is measured from the start of one cycle to the start of
    /// the next; a cycle that overruns it is followed immediately by the next.
    /// Returns the number of cycles that completed.
    pub async fn run(&mut self, interval: Duration) -> usize {
        let mut cycles = 0;

        loop {
            let started = Instant::now();
            let report = self.run_cycle().await;
            if report.interrupted {
                break;
            }
            cycles += 1;
            info!(
                cycle = cycles,
                results = report.result_count(),
                propers = report.proper_count(),
                "Poll cycle complete"
            );

            tokio::select! {
                _ = tokio::time::sleep(interval.saturating_sub(started.elapsed())) => {}
                _ = self.shutdown.triggered() => break,
            }
        }

        info!(cycles, "Poller stopped");
        cycles
    }
}
