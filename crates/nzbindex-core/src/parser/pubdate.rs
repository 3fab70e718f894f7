//! Publish date parsing for NZBIndex feed items

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex_lite::Regex;

use crate::error::{NzbIndexError, Result};

/// chrono format of the date NZBIndex emits, e.g. "Tue, 05 Mar 2013 18:21:07 +0100",
/// with the weekday already stripped
const FEED_DATE_FORMAT: &str = "%d %b %Y %H:%M:%S %z";

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:\w{3}, )?(\d{1,2} \w{3} \d{4} \d\d:\d\d:\d\d) ([+-]\d{4})")
            .expect("date pattern is valid")
    })
}

/// Parse a feed `pubDate` value into a UTC timestamp.
///
/// The date is located anywhere in the string, so surrounding whitespace or
/// trailing zone names are tolerated. The numeric offset is honoured; the
/// weekday name is ignored, even when it does not match the date.
///
/// # Errors
/// Returns `NzbIndexError::InvalidDate` when no date in the expected format
/// is present or the matched text is not a real calendar date.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use nzbindex_core::parser::parse_pub_date;
///
/// let parsed = parse_pub_date("Tue, 05 Mar 2013 18:21:07 +0100").unwrap();
/// assert_eq!(parsed, Utc.with_ymd_and_hms(2013, 3, 5, 17, 21, 7).unwrap());
/// ```
pub fn parse_pub_date(value: &str) -> Result<DateTime<Utc>> {
    let caps = date_regex()
        .captures(value)
        .ok_or_else(|| NzbIndexError::InvalidDate(value.to_string()))?;

    let text = format!("{} {}", &caps[1], &caps[2]);
    DateTime::parse_from_str(&text, FEED_DATE_FORMAT)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| NzbIndexError::InvalidDate(format!("{}: {}", value, e)))
}
