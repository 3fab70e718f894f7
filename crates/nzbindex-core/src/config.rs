//! Provider configuration
//!
//! Every field has a default matching NZBIndex's published usage policy, so a
//! TOML file only needs to name the values it overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_USER_AGENT;
use crate::error::{NzbIndexError, Result};

/// Base URL of the NZBIndex service
pub const NZBINDEX_BASE_URL: &str = "http://nzbindex.nl";

/// Configuration for an NZBIndex provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Service root; the RSS endpoint lives at `{base_url}/rss/`
    pub base_url: String,
    /// Minimum seconds between two searches (default: 10)
    pub search_interval_secs: u64,
    /// Minimum minutes between two cache refreshes (default: 25)
    pub cache_interval_mins: u64,
    /// Result cap for searches (default: 200)
    pub max_results: u32,
    /// Result cap for the cache refresh (default: 50)
    pub cache_max_results: u32,
    /// Minimum post size sent as `minsize` (default: 100)
    pub min_size: u32,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// User-Agent sent with every request
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: NZBINDEX_BASE_URL.to_string(),
            search_interval_secs: 10,
            cache_interval_mins: 25,
            max_results: 200,
            cache_max_results: 50,
            min_size: 100,
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ProviderConfig {
    /// Parse a configuration from TOML text
    ///
    /// # Errors
    /// Returns `NzbIndexError::Config` if the text is not valid TOML or a
    /// field has the wrong type.
    ///
    /// # Example
    /// ```
    /// use nzbindex_core::ProviderConfig;
    ///
    /// let config = ProviderConfig::from_toml_str("max_results = 100").unwrap();
    /// assert_eq!(config.max_results, 100);
    /// assert_eq!(config.search_interval_secs, 10);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| NzbIndexError::Config(e.to_string()))
    }

    pub fn search_interval(&self) -> Duration {
        Duration::from_secs(self.search_interval_secs)
    }

    pub fn cache_interval(&self) -> Duration {
        Duration::from_secs(self.cache_interval_mins.saturating_mul(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ProviderConfig::default();
        assert_eq!(config.base_url, "http://nzbindex.nl");
        assert_eq!(config.search_interval(), Duration::from_secs(10));
        assert_eq!(config.cache_interval(), Duration::from_secs(25 * 60));
        assert_eq!(config.max_results, 200);
        assert_eq!(config.cache_max_results, 50);
        assert_eq!(config.min_size, 100);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_config_partial_toml() {
        let config = ProviderConfig::from_toml_str(
            r#"
            base_url = "http://localhost:8080"
            cache_interval_mins = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.cache_interval(), Duration::from_secs(3600));
        assert_eq!(config.max_results, 200);
    }

    #[test]
    fn test_config_huge_cache_interval_saturates() {
        let config =
            ProviderConfig::from_toml_str("cache_interval_mins = 400000000000000000").unwrap();
        assert_eq!(config.cache_interval(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_config_invalid_type() {
        let result = ProviderConfig::from_toml_str("max_results = \"lots\"");
        assert!(matches!(result, Err(NzbIndexError::Config(_))));
    }
}
