//! NZBIndex Poller
//!
//! Drives one or more [`SearchProvider`](nzbindex_core::SearchProvider)
//! implementations on a fixed schedule: every cycle refreshes each
//! provider's recent-posts cache, searches the configured watchlist and
//! checks for new proper/repack releases.
//!
//! # Usage
//!
//! ```rust,no_run
//! use nzbindex_core::{NzbIndexProvider, SceneTokens};
//! use nzbindex_poller::{Poller, PollerConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = PollerConfig::load("poller.toml".as_ref())?;
//! let provider = NzbIndexProvider::with_config(config.provider.clone())?;
//!
//! let mut poller = Poller::new(Box::new(SceneTokens), config.watchlist.clone());
//! poller.add_provider(provider);
//!
//! let report = poller.run_cycle().await;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod poller;

pub use config::{PollerConfig, WatchEntry};
pub use poller::{PollReport, Poller, ProviderReport};
