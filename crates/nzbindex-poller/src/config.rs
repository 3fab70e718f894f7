//! Poller configuration loaded from TOML

use std::path::Path;

use anyhow::{Context, Result};
use nzbindex_core::{ProviderConfig, ShowRef};
use serde::{Deserialize, Serialize};

/// One show (or single episode) the poller searches for every cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub show: ShowRef,
    pub season: u32,
    /// Search a single episode; the whole season when absent
    #[serde(default)]
    pub episode: Option<u32>,
}

/// Top-level poller configuration
///
/// ```toml
/// poll_interval_secs = 1800
/// propers = true
///
/// [provider]
/// cache_interval_mins = 30
///
/// [[watchlist]]
/// season = 7
/// episode = 5
/// show = { name = "Doctor Who 2005" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Seconds from the start of one poll cycle to the start of the next (default: 1800)
    pub poll_interval_secs: u64,
    /// Search for proper/repack releases every cycle (default: true)
    pub propers: bool,
    pub provider: ProviderConfig,
    pub watchlist: Vec<WatchEntry>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 1800,
            propers: true,
            provider: ProviderConfig::default(),
            watchlist: Vec::new(),
        }
    }
}

impl PollerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse poller configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text)
    }
}
