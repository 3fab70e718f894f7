//! Error types for the NZBIndex provider
//!
//! Internal layers (fetching, parsing, configuration) return these errors.
//! The provider surface converts them into empty result sets so a scheduled
//! poll cycle is never halted. NzbIndexError implements Serialize so poll
//! reports can carry it as JSON.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for NZBIndex provider operations
#[derive(Error, Debug)]
pub enum NzbIndexError {
    /// HTTP request failed at the transport level
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    /// Rate limited by the server (HTTP 429)
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Requested resource was not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Feed document is not well-formed XML
    #[error("Failed to parse feed: {0}")]
    ParseError(String),

    /// Publish date did not match the feed date format
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration could not be loaded
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The enclosing poll cycle was shut down while waiting
    #[error("Operation cancelled")]
    Cancelled,
}

/// Serialize NzbIndexError as its display string
impl Serialize for NzbIndexError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for NZBIndex provider operations
pub type Result<T> = std::result::Result<T, NzbIndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_parse_error() {
        let error = NzbIndexError::ParseError("mismatched end tag".to_string());
        assert_eq!(error.to_string(), "Failed to parse feed: mismatched end tag");
    }

    #[test]
    fn test_error_display_http_status() {
        let error = NzbIndexError::HttpStatus(503);
        assert_eq!(error.to_string(), "HTTP error: status 503");
    }

    #[test]
    fn test_error_display_rate_limited() {
        let error = NzbIndexError::RateLimited;
        assert_eq!(error.to_string(), "Rate limited - too many requests");
    }

    #[test]
    fn test_error_display_not_found() {
        let error = NzbIndexError::NotFound("http://nzbindex.nl/rss/".to_string());
        assert_eq!(error.to_string(), "Not found: http://nzbindex.nl/rss/");
    }

    #[test]
    fn test_error_display_invalid_date() {
        let error = NzbIndexError::InvalidDate("yesterday".to_string());
        assert_eq!(error.to_string(), "Invalid date: yesterday");
    }

    #[test]
    fn test_error_display_cancelled() {
        assert_eq!(NzbIndexError::Cancelled.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_error_serialize() {
        let error = NzbIndexError::ParseError("test error".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, "\"Failed to parse feed: test error\"");
    }

    #[test]
    fn test_error_serialize_config() {
        let error = NzbIndexError::Config("missing field".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, "\"Invalid configuration: missing field\"");
    }
}
