//! Search token generation
//!
//! The provider does not decide what to search for; a [`TokenGenerator`]
//! turns show metadata into the strings that are both sent as queries and
//! used to reconcile result titles. [`SceneTokens`] is the default,
//! producing scene-style release names.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::types::{EpisodeRef, SearchTokens, ShowRef};

/// Source of search tokens for episode and season lookups
pub trait TokenGenerator: Send + Sync {
    fn tokens_for_episode(&self, episode: &EpisodeRef) -> SearchTokens;

    fn tokens_for_season(&self, show: &ShowRef, season: u32) -> SearchTokens;
}

/// Scene-style tokens such as `Show.Name.S01E02` and `Show.Name.S01`
///
/// One token per distinct show name (primary name and aliases).
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneTokens;

impl TokenGenerator for SceneTokens {
    fn tokens_for_episode(&self, episode: &EpisodeRef) -> SearchTokens {
        let tokens = scene_names(&episode.show)
            .into_iter()
            .map(|name| format!("{}.S{:02}E{:02}", name, episode.season, episode.episode));
        SearchTokens::new(tokens)
    }

    fn tokens_for_season(&self, show: &ShowRef, season: u32) -> SearchTokens {
        let tokens = scene_names(show)
            .into_iter()
            .map(|name| format!("{}.S{:02}", name, season));
        SearchTokens::new(tokens)
    }
}

/// Distinct sanitized names of a show, primary name first
fn scene_names(show: &ShowRef) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in show.names().map(sanitize_scene_name) {
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

fn dots_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.{2,}").expect("dots pattern is valid"))
}

/// Convert a show name into the dotted form used in release names.
///
/// # Example
/// ```
/// use nzbindex_core::tokens::sanitize_scene_name;
///
/// assert_eq!(sanitize_scene_name("Law & Order: SVU"), "Law.and.Order.SVU");
/// assert_eq!(sanitize_scene_name("Marvel's Agents of S.H.I.E.L.D."), "Marvels.Agents.of.S.H.I.E.L.D");
/// ```
pub fn sanitize_scene_name(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| !matches!(c, ',' | ':' | '(' | ')' | '\'' | '!' | '?' | '\u{2019}'))
        .collect();

    let dotted = stripped
        .trim()
        .replace("- ", ".")
        .replace(' ', ".")
        .replace('&', "and")
        .replace('/', ".");

    dots_regex()
        .replace_all(&dotted, ".")
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show() -> ShowRef {
        ShowRef {
            name: "The Office (US)".to_string(),
            aliases: vec!["The Office US".to_string(), "The Office".to_string()],
        }
    }

    #[test]
    fn test_sanitize_scene_name() {
        assert_eq!(sanitize_scene_name("Lost"), "Lost");
        assert_eq!(sanitize_scene_name("The Office (US)"), "The.Office.US");
        assert_eq!(sanitize_scene_name("Star Trek - Picard"), "Star.Trek.Picard");
        assert_eq!(sanitize_scene_name("Who?!"), "Who");
        assert_eq!(sanitize_scene_name("AC/DC Live"), "AC.DC.Live");
    }

    #[test]
    fn test_episode_tokens_dedupe_aliases() {
        let episode = EpisodeRef {
            show: show(),
            season: 1,
            episode: 2,
        };

        let tokens = SceneTokens.tokens_for_episode(&episode);
        assert_eq!(
            tokens,
            SearchTokens::new(["The.Office.US.S01E02", "The.Office.S01E02"])
        );
    }

    #[test]
    fn test_season_tokens() {
        let tokens = SceneTokens.tokens_for_season(&ShowRef::new("Lost"), 3);
        assert_eq!(tokens, SearchTokens::new(["Lost.S03"]));
    }

    #[test]
    fn test_blank_show_produces_no_tokens() {
        let tokens = SceneTokens.tokens_for_season(&ShowRef::new("  ?! "), 1);
        assert!(tokens.is_empty());
    }
}
