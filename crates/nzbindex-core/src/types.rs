//! Data types for the NZBIndex provider
//!
//! This module contains the records passed between the feed parser, the title
//! reconciler and the provider. Result types implement Serialize and
//! Deserialize so poll reports can be emitted as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title the indexer uses to mark an entry as intentionally unusable
pub const INVALID_TITLE_SENTINEL: &str = "Not_Valid";

/// Ordered set of terms the caller expects to see reflected in result titles
///
/// Episode and season lookups carry at least one token. The cache refresh and
/// the proper/repack search use [`SearchTokens::empty`], which makes title
/// reconciliation fall back to the raw title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTokens(Vec<String>);

impl SearchTokens {
    /// Create a token set from any list of strings, keeping order
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tokens.into_iter().map(Into::into).collect())
    }

    /// Token set used for unconstrained queries
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a SearchTokens {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One `<item>` entry as read from the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResultItem {
    /// Title exactly as published, with all indexer decoration
    pub title: String,
    /// NZB download link
    pub link: String,
    /// Publish date in feed-native format (e.g. "Tue, 05 Mar 2013 18:21:07 +0100")
    pub pub_date: Option<String>,
}

/// A usable search result after title reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedResult {
    /// Reconciled canonical title, or the raw title when nothing matched
    pub title: String,
    /// NZB download link
    pub url: String,
    /// Publish date, when the feed carried a parsable one
    pub published: Option<DateTime<Utc>>,
}

/// A proper/repack release newer than the caller's watermark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProperResult {
    pub title: String,
    pub url: String,
    pub published: DateTime<Utc>,
}

/// Show metadata needed to generate search tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowRef {
    /// Primary show name
    pub name: String,
    /// Alternative names the show is released under
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl ShowRef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
        }
    }

    /// Primary name followed by all aliases
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// A single episode of a show
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub show: ShowRef,
    /// Season number (1-based)
    pub season: u32,
    /// Episode number within the season (1-based)
    pub episode: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_search_tokens_keep_order() {
        let tokens = SearchTokens::new(["Show.S01E02", "Show.1x02"]);
        let collected: Vec<&String> = tokens.iter().collect();
        assert_eq!(collected, ["Show.S01E02", "Show.1x02"]);
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_search_tokens_empty() {
        assert!(SearchTokens::empty().is_empty());
        assert_eq!(SearchTokens::empty(), SearchTokens::default());
    }

    #[test]
    fn test_show_names_include_aliases() {
        let show = ShowRef {
            name: "The Office (US)".to_string(),
            aliases: vec!["The Office".to_string()],
        };
        let names: Vec<&str> = show.names().collect();
        assert_eq!(names, ["The Office (US)", "The Office"]);
    }

    #[test]
    fn test_resolved_result_serialization() {
        let result = ResolvedResult {
            title: "Show.Name.S01E02.720p".to_string(),
            url: "http://nzbindex.nl/download/1/".to_string(),
            published: Some(Utc.with_ymd_and_hms(2013, 3, 5, 17, 21, 7).unwrap()),
        };

        let json = serde_json::to_string(&result).unwrap();
        let deserialized: ResolvedResult = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, result);
    }

    #[test]
    fn test_show_ref_aliases_default() {
        let show: ShowRef = serde_json::from_str(r#"{"name":"Lost"}"#).unwrap();
        assert!(show.aliases.is_empty());
    }
}
