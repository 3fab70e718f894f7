//! Parsers for NZBIndex responses
//!
//! - `feed`: Parse the RSS document into raw result items
//! - `title`: Reconcile decorated titles with the searched tokens
//! - `pubdate`: Parse feed publish dates

pub mod feed;
pub mod pubdate;
pub mod title;

// Re-export main parsing functions
pub use feed::parse_feed;
pub use pubdate::parse_pub_date;
pub use title::{candidate_words, reconcile, TitleMatch};
