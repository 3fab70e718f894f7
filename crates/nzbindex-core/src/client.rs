//! HTTP fetching and request pacing for NZBIndex
//!
//! This module provides the pacing primitive shared by searches and cache
//! refreshes, the [`FeedFetcher`] boundary the provider fetches through, and
//! a reqwest-backed implementation of it.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::ProviderConfig;
use crate::error::{NzbIndexError, Result};

/// Default User-Agent mimicking a desktop browser
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.7; rv:5.0) Gecko/20100101 Firefox/5.0";

/// Build the browser-like header set NZBIndex expects on every request
///
/// The service treats clients without these headers differently, so every
/// outbound query carries the full set.
pub fn browser_headers(user_agent: &str) -> Vec<(String, String)> {
    [
        ("User-Agent", user_agent),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
        ("Accept-Language", "de-de,de;q=0.8,en-us;q=0.5,en;q=0.3"),
        ("Accept-Charset", "ISO-8859-1,utf-8;q=0.7,*;q=0.7"),
        ("Connection", "keep-alive"),
        ("Cache-Control", "max-age=0"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

/// Pacing state for one kind of outbound operation
///
/// Tracks when the last query went out and how long must pass before the next
/// one. The limiter never sleeps on its own initiative: [`RateLimiter::remaining`]
/// reports the outstanding delay and [`RateLimiter::wait`] suspends
/// cooperatively. Callers record a query with [`RateLimiter::mark`] right
/// after the outbound call completes, whether it succeeded or not.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Minimum interval between queries
    min_interval: Duration,
    /// Timestamp of the last query, if any was made
    last_request: Option<Instant>,
}

impl RateLimiter {
    /// Create a limiter enforcing `min_interval` between queries
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use nzbindex_core::client::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(Duration::from_secs(10));
    /// assert!(limiter.remaining().is_zero());
    /// ```
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Get the minimum interval between queries
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Time of the last recorded query
    pub fn last_request(&self) -> Option<Instant> {
        self.last_request
    }

    /// Delay still owed at `now` before the next query may go out
    pub fn remaining_at(&self, now: Instant) -> Duration {
        match self.last_request {
            Some(last) => match last.checked_add(self.min_interval) {
                Some(ready_at) => ready_at.saturating_duration_since(now),
                // Past the clock's range: the whole interval is still owed
                None => self.min_interval,
            },
            None => Duration::ZERO,
        }
    }

    /// Delay still owed right now
    pub fn remaining(&self) -> Duration {
        self.remaining_at(Instant::now())
    }

    /// Whether a query may go out without waiting
    pub fn is_ready(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Suspend until the minimum interval since the last query has elapsed
    pub async fn wait(&self) {
        let delay = self.remaining();
        if !delay.is_zero() {
            info!(delay_secs = delay.as_secs_f64(), "Sleeping to respect NZBIndex's rules");
            sleep(delay).await;
        }
    }

    /// Like [`RateLimiter::wait`], but gives up when `shutdown` fires
    ///
    /// # Errors
    /// Returns `NzbIndexError::Cancelled` if shutdown was requested before or
    /// during the wait.
    pub async fn wait_or_cancel(&self, shutdown: &ShutdownSignal) -> Result<()> {
        if shutdown.is_triggered() {
            return Err(NzbIndexError::Cancelled);
        }

        tokio::select! {
            _ = self.wait() => Ok(()),
            _ = shutdown.triggered() => Err(NzbIndexError::Cancelled),
        }
    }

    /// Record that a query went out now
    pub fn mark(&mut self) {
        self.last_request = Some(Instant::now());
    }
}

/// Shutdown notification for an enclosing poll cycle
///
/// Wraps a `watch` receiver; sending `true` on the paired sender aborts any
/// pacing wait in progress. A signal whose sender is gone never fires.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    /// Create a signal together with the sender that triggers it
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self::new(rx))
    }

    /// A signal that is never triggered
    pub fn never() -> Self {
        let (_, signal) = Self::channel();
        signal
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown has been requested
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        let outcome = rx.wait_for(|stop| *stop).await.map(|_| ());
        if outcome.is_err() {
            // Sender dropped without requesting shutdown
            std::future::pending::<()>().await;
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::never()
    }
}

/// Boundary through which the provider retrieves raw feed bytes
///
/// Implementations return `None` for any failure; a missing response is not
/// exceptional for a best-effort search.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str, headers: &[(String, String)]) -> Option<Vec<u8>>;
}

/// reqwest-backed [`FeedFetcher`]
///
/// No retries are attempted: a failed request still counts against the
/// caller's pacing, and the next scheduled poll tries again.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with default configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new() -> Result<Self> {
        Self::with_config(&ProviderConfig::default())
    }

    /// Create a fetcher using the timeout and User-Agent from `config`
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn with_config(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client })
    }

    /// GET `url` with `headers`, returning the body bytes
    ///
    /// # Errors
    /// - `NzbIndexError::Http` - Network or transport error
    /// - `NzbIndexError::NotFound` - Server returned 404
    /// - `NzbIndexError::RateLimited` - Server returned 429
    /// - `NzbIndexError::HttpStatus` - Any other non-success status
    pub async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<Vec<u8>> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.bytes().await?.to_vec());
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(NzbIndexError::NotFound(url.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(NzbIndexError::RateLimited);
        }

        Err(NzbIndexError::HttpStatus(status.as_u16()))
    }
}

#[async_trait]
impl FeedFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, headers: &[(String, String)]) -> Option<Vec<u8>> {
        match self.get(url, headers).await {
            Ok(body) => {
                debug!(url, bytes = body.len(), "Fetched feed");
                Some(body)
            }
            Err(e) => {
                warn!(url, error = %e, "Feed request failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_rate_limiter_creation() {
        let limiter = RateLimiter::new(Duration::from_secs(10));
        assert_eq!(limiter.min_interval(), Duration::from_secs(10));
        assert!(limiter.last_request().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_first_query_is_free() {
        let limiter = RateLimiter::new(Duration::from_secs(10));
        assert!(limiter.is_ready());

        let start = Instant::now();
        limiter.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_remaining_after_mark() {
        let mut limiter = RateLimiter::new(Duration::from_secs(10));
        limiter.mark();
        let marked = limiter.last_request().unwrap();

        assert_eq!(limiter.remaining_at(marked), Duration::from_secs(10));
        assert_eq!(
            limiter.remaining_at(marked + Duration::from_secs(4)),
            Duration::from_secs(6)
        );
        assert_eq!(limiter.remaining_at(marked + Duration::from_secs(30)), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_huge_interval_does_not_overflow() {
        let interval = Duration::from_secs(i64::MAX as u64);
        let mut limiter = RateLimiter::new(interval);
        limiter.mark();

        assert_eq!(limiter.remaining(), interval);
        assert!(!limiter.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_second_dispatch_waits_full_interval() {
        let mut limiter = RateLimiter::new(Duration::from_secs(10));

        limiter.wait().await;
        let first = Instant::now();
        limiter.mark();

        limiter.wait().await;
        let second = Instant::now();

        assert!(second - first >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_only_waits_remainder() {
        let mut limiter = RateLimiter::new(Duration::from_secs(10));
        limiter.mark();
        tokio::time::advance(Duration::from_secs(7)).await;

        let start = Instant::now();
        limiter.wait().await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(3));
        assert!(waited < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_or_cancel_aborts_on_shutdown() {
        let mut limiter = RateLimiter::new(Duration::from_secs(600));
        limiter.mark();
        let (tx, shutdown) = ShutdownSignal::channel();

        let waiter = tokio::spawn(async move { limiter.wait_or_cancel(&shutdown).await });
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(true).unwrap();

        let outcome = waiter.await.unwrap();
        assert!(matches!(outcome, Err(NzbIndexError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_or_cancel_already_triggered() {
        let limiter = RateLimiter::new(Duration::from_secs(10));
        let (tx, shutdown) = ShutdownSignal::channel();
        tx.send(true).unwrap();

        assert!(matches!(
            limiter.wait_or_cancel(&shutdown).await,
            Err(NzbIndexError::Cancelled)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_or_cancel_with_dropped_sender_completes() {
        let mut limiter = RateLimiter::new(Duration::from_secs(10));
        limiter.mark();

        let outcome = limiter.wait_or_cancel(&ShutdownSignal::never()).await;
        assert!(outcome.is_ok());
        assert!(limiter.is_ready());
    }

    #[test]
    fn test_browser_headers_carry_user_agent() {
        let headers = browser_headers(DEFAULT_USER_AGENT);
        assert_eq!(headers.len(), 6);
        assert_eq!(headers[0], ("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string()));
        assert!(headers.iter().any(|(name, _)| name == "Accept-Language"));
    }

    #[test]
    fn test_fetcher_creation() {
        assert!(HttpFetcher::new().is_ok());
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_headers() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rss/"))
            .and(query_param("q", "lost"))
            .and(header("User-Agent", DEFAULT_USER_AGENT))
            .and(header("Cache-Control", "max-age=0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<rss/>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let url = format!("{}/rss/?q=lost", mock_server.uri());
        let body = fetcher.fetch(&url, &browser_headers(DEFAULT_USER_AGENT)).await;

        assert_eq!(body.as_deref(), Some(&b"<rss/>"[..]));
    }

    #[tokio::test]
    async fn test_get_classifies_statuses() {
        let mock_server = MockServer::start().await;
        Mock::given(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;
        Mock::given(path("/busy"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;
        Mock::given(path("/down"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let base = mock_server.uri();

        assert!(matches!(
            fetcher.get(&format!("{}/missing", base), &[]).await,
            Err(NzbIndexError::NotFound(_))
        ));
        assert!(matches!(
            fetcher.get(&format!("{}/busy", base), &[]).await,
            Err(NzbIndexError::RateLimited)
        ));
        assert!(matches!(
            fetcher.get(&format!("{}/down", base), &[]).await,
            Err(NzbIndexError::HttpStatus(503))
        ));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_absent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let body = fetcher.fetch(&format!("{}/rss/", mock_server.uri()), &[]).await;
        assert!(body.is_none());
    }
}
