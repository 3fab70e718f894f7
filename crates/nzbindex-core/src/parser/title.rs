//! Title reconciliation for NZBIndex results
//!
//! NZBIndex titles are raw Usenet subjects such as
//! `[01/20] - "Show.Name.S01E02.720p.HDTV.par2" yEnc (1/1)`. This module maps
//! such a subject back to the release name the caller searched for.

use std::sync::OnceLock;

use regex_lite::Regex;
use tracing::{debug, warn};

use crate::types::SearchTokens;

/// Outcome of reconciling one raw title against the active search tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleMatch {
    /// Exactly one candidate word matched a token
    Unique(String),
    /// Several candidate words matched; the first one is used
    Ambiguous {
        chosen: String,
        candidates: Vec<String>,
    },
    /// Nothing matched; carries the original title unchanged
    Unmatched(String),
}

impl TitleMatch {
    /// The title to use for this result
    pub fn title(&self) -> &str {
        match self {
            TitleMatch::Unique(title) => title,
            TitleMatch::Ambiguous { chosen, .. } => chosen,
            TitleMatch::Unmatched(title) => title,
        }
    }

    pub fn into_title(self) -> String {
        match self {
            TitleMatch::Unique(title) => title,
            TitleMatch::Ambiguous { chosen, .. } => chosen,
            TitleMatch::Unmatched(title) => title,
        }
    }

    pub fn is_match(&self) -> bool {
        !matches!(self, TitleMatch::Unmatched(_))
    }
}

fn bracket_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\[\]()<>]+").expect("bracket pattern is valid"))
}

fn noise_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\s+|'|"|\.par2"#).expect("noise pattern is valid"))
}

/// Split a raw title into candidate words.
///
/// Bracket characters, whitespace runs, quotes and the `.par2` repair-file
/// suffix become separators. Text inside brackets is kept.
///
/// # Example
/// ```
/// use nzbindex_core::parser::candidate_words;
///
/// assert_eq!(
///     candidate_words(r#"[01/20] - "Show.S01E02.par2" yEnc (1/1)"#),
///     ["01/20", "-", "Show.S01E02", "yEnc", "1/1"]
/// );
/// ```
pub fn candidate_words(raw_title: &str) -> Vec<String> {
    let without_brackets = bracket_regex().replace_all(raw_title, " ");
    let cleaned = noise_regex().replace_all(&without_brackets, " ");
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Reconcile a raw result title with the tokens that produced the batch.
///
/// A candidate word matches a token when the lower-cased word starts with the
/// lower-cased first word of the token. Matches are kept in the order the
/// words appear, without duplicates.
///
/// # Arguments
/// * `raw_title` - Title as published by the feed
/// * `tokens` - Search tokens of the current lookup
///
/// # Returns
/// * `TitleMatch::Unique` with the single matching word
/// * `TitleMatch::Ambiguous` with the first of several matching words
/// * `TitleMatch::Unmatched` with `raw_title` when nothing matched
///
/// # Example
/// ```
/// use nzbindex_core::parser::reconcile;
/// use nzbindex_core::SearchTokens;
///
/// let tokens = SearchTokens::new(["Show.Name.S01E02"]);
/// let matched = reconcile(r#"[1/9] "Show.Name.S01E02.720p-GRP.par2" yEnc"#, &tokens);
/// assert_eq!(matched.title(), "Show.Name.S01E02.720p-GRP");
/// ```
pub fn reconcile(raw_title: &str, tokens: &SearchTokens) -> TitleMatch {
    let prefixes: Vec<String> = tokens
        .iter()
        .filter_map(|token| token.split_whitespace().next())
        .map(str::to_lowercase)
        .collect();

    let mut matches: Vec<String> = Vec::new();
    for word in candidate_words(raw_title) {
        let lowered = word.to_lowercase();
        for prefix in &prefixes {
            if lowered.starts_with(prefix.as_str()) && !matches.contains(&word) {
                matches.push(word.clone());
            }
        }
    }

    match matches.len() {
        0 => {
            debug!(raw_title, "Could not fix title, keeping the original");
            TitleMatch::Unmatched(raw_title.to_string())
        }
        1 => {
            let title = matches.remove(0);
            debug!(raw_title, title = %title, "Fixed title");
            TitleMatch::Unique(title)
        }
        _ => {
            warn!(
                raw_title,
                candidates = ?matches,
                "More than one match for the fixed title, using the first"
            );
            TitleMatch::Ambiguous {
                chosen: matches[0].clone(),
                candidates: matches,
            }
        }
    }
}
