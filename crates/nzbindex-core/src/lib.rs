//! NZBIndex Provider Core Library
//!
//! This crate provides a polling client for the NZBIndex binary-newsgroup
//! search service (nzbindex.nl).
//!
//! # Features
//! - Keyword searches against the RSS search endpoint
//! - Reconciliation of decorated Usenet subjects with the searched release names
//! - Proper/repack filtering against a publish-date watermark
//! - Paced requests: 10 seconds between searches, 25 minutes between cache refreshes

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod parser;
pub mod proper;
pub mod provider;
pub mod query;
pub mod tokens;
pub mod types;

// Re-export main types for convenience
pub use cache::FeedCache;
pub use client::{FeedFetcher, HttpFetcher, RateLimiter, ShutdownSignal};
pub use config::ProviderConfig;
pub use error::{NzbIndexError, Result};
pub use provider::{NzbIndexProvider, SearchProvider};
pub use tokens::{SceneTokens, TokenGenerator};
pub use types::{
    EpisodeRef, ProperResult, RawResultItem, ResolvedResult, SearchTokens, ShowRef,
};
