//! Proper/repack release filtering
//!
//! Proper and repack releases are re-uploads that replace an earlier post.
//! The provider searches for them server-side and keeps only the ones
//! published after the caller's watermark.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::parser::parse_pub_date;
use crate::types::{ProperResult, RawResultItem};

/// Server-side keyword query selecting proper and repack posts
pub const PROPER_QUERY: &str = "(PROPER,REPACK)";

/// Keep the items published strictly after `watermark`.
///
/// Items without a parsable publish date are skipped. With no watermark every
/// dated item is kept. Feed order is preserved.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use nzbindex_core::proper::filter_propers;
/// use nzbindex_core::RawResultItem;
///
/// let items = vec![RawResultItem {
///     title: "Show.S01E02.PROPER".to_string(),
///     link: "http://nzbindex.nl/download/1/".to_string(),
///     pub_date: Some("Tue, 05 Mar 2013 18:21:07 +0000".to_string()),
/// }];
/// let watermark = Utc.with_ymd_and_hms(2013, 3, 1, 0, 0, 0).unwrap();
/// assert_eq!(filter_propers(items, Some(watermark)).len(), 1);
/// ```
pub fn filter_propers(
    items: Vec<RawResultItem>,
    watermark: Option<DateTime<Utc>>,
) -> Vec<ProperResult> {
    let mut results = Vec::new();

    for item in items {
        let published = match item.pub_date.as_deref().map(parse_pub_date) {
            Some(Ok(published)) => published,
            Some(Err(e)) => {
                warn!(title = %item.title, error = %e, "Unable to figure out the date for entry, skipping it");
                continue;
            }
            None => {
                warn!(title = %item.title, "Entry has no publish date, skipping it");
                continue;
            }
        };

        if watermark.map_or(true, |mark| published > mark) {
            results.push(ProperResult {
                title: item.title,
                url: item.link,
                published,
            });
        } else {
            debug!(title = %item.title, %published, "Proper is not newer than the watermark");
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(title: &str, pub_date: Option<&str>) -> RawResultItem {
        RawResultItem {
            title: title.to_string(),
            link: format!("http://nzbindex.nl/download/{}/", title),
            pub_date: pub_date.map(str::to_string),
        }
    }

    fn watermark() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2013, 3, 3, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_filter_keeps_only_newer_items() {
        let items = vec![
            item("newer", Some("Tue, 05 Mar 2013 18:21:07 +0000")),
            item("older", Some("Fri, 01 Mar 2013 08:00:00 +0000")),
        ];

        let results = filter_propers(items, Some(watermark()));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "newer");
        assert_eq!(results[0].url, "http://nzbindex.nl/download/newer/");
        assert_eq!(
            results[0].published,
            Utc.with_ymd_and_hms(2013, 3, 5, 18, 21, 7).unwrap()
        );
    }

    #[test]
    fn test_filter_equal_to_watermark_is_dropped() {
        let items = vec![item("same", Some("Sun, 03 Mar 2013 12:00:00 +0000"))];
        assert!(filter_propers(items, Some(watermark())).is_empty());
    }

    #[test]
    fn test_filter_respects_offset() {
        // 13:30 +0200 is 11:30 UTC, before the 12:00 UTC watermark
        let items = vec![item("east", Some("Sun, 03 Mar 2013 13:30:00 +0200"))];
        assert!(filter_propers(items, Some(watermark())).is_empty());
    }

    #[test]
    fn test_filter_without_watermark_keeps_everything_dated() {
        let items = vec![
            item("a", Some("Tue, 05 Mar 2013 18:21:07 +0000")),
            item("b", Some("Fri, 01 Mar 2013 08:00:00 +0000")),
        ];

        let titles: Vec<String> = filter_propers(items, None)
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, ["a", "b"]);
    }

    #[test]
    fn test_filter_drops_undated_items() {
        let items = vec![
            item("missing", None),
            item("garbled", Some("last tuesday")),
            item("good", Some("Tue, 05 Mar 2013 18:21:07 +0000")),
        ];

        let results = filter_propers(items, None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "good");
    }
}
