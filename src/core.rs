use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware, state::InMemoryState,
    state::NotKeyed,
};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::config::DashboardConfig;
use super::error::{DashboardError, Result};

const INITIAL_BACKOFF_MS: u64 = 1000; // 1 second

type Governor = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

#[derive(Debug, Clone)]
pub struct DashboardClient {
    /// HTTP client for making requests
    pub(crate) client: reqwest::Client,

    /// Token bucket rate limiter shared by clones of this client
    pub(crate) rate_limiter: Arc<Governor>,

    /// Root URL of the dashboard backend, without a trailing slash
    pub(crate) base_url: String,

    /// Retries allowed for rate-limited or failed requests
    pub(crate) max_retries: u32,
}

/// HTTP client for the dashboard backend with built-in rate limiting and retry logic.
///
/// `DashboardClient` is the transport behind the dashboard controllers. It speaks the
/// backend's small JSON API (`/api/reports`, `/api/report-details`,
/// `/api/latest-report`) and fetches raw filing documents through `/proxy-filing`.
///
/// # Rate Limiting
///
/// Every request first takes a token from a bucket refilled at
/// [`DashboardConfig::rate_limit`] tokens per second. The backend forwards most calls
/// to SEC.gov, so hammering it on rapid re-selection only gets everyone throttled.
///
/// # Error Handling
///
/// Non-success responses are turned into [`DashboardError::Request`] carrying the
/// backend's `detail` message when the body has one, otherwise `Error: <status>`.
/// HTTP 429 and transport failures are retried with exponential backoff and jitter up
/// to [`DashboardConfig::max_retries`] times.
///
/// # Examples
///
/// ```rust
/// # use edgardash::DashboardClient;
/// let client = DashboardClient::new("http://127.0.0.1:8000")?;
/// assert_eq!(client.base_url(), "http://127.0.0.1:8000");
/// # Ok::<(), edgardash::DashboardError>(())
/// ```
impl DashboardClient {
    /// Creates a client for the backend at `base_url` with default settings.
    pub fn new(base_url: &str) -> Result<Self> {
        let config = DashboardConfig {
            base_url: base_url.to_string(),
            ..DashboardConfig::default()
        };
        Self::with_config(config)
    }

    /// Creates a client with custom configuration settings.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Config` if the user agent is malformed, the rate limit
    /// is zero, or the HTTP client cannot be built with the provided configuration.
    pub fn with_config(config: DashboardConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| DashboardError::Config(format!("Invalid user agent: {}", e)))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                DashboardError::Config(format!("Failed to build HTTP client: {}", e))
            })?;

        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(config.rate_limit).ok_or_else(|| {
                DashboardError::Config("Rate limit must be greater than zero".to_string())
            })?,
        )));

        Ok(DashboardClient {
            client,
            rate_limiter,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
        })
    }

    /// Calculates the wait before a retry: `(2^retry × 1000ms) ± 10%`.
    fn calculate_backoff(retry: u32) -> Duration {
        let backoff_ms = INITIAL_BACKOFF_MS * (2_u64.pow(retry));
        let jitter = (backoff_ms as f64 * 0.2 * (fastrand::f64() - 0.5)) as i64;
        Duration::from_millis((backoff_ms as i64 + jitter) as u64)
    }

    /// Fetches a response body as bytes, retrying on 429 and transport failures.
    ///
    /// # Errors
    ///
    /// * `DashboardError::Request` - Any other non-success status, message from `detail`
    /// * `DashboardError::RateLimitExceeded` - 429 persisted after max retries
    /// * `DashboardError::Transport` - Network failure after max retries
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.send(url).await?;
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(DashboardError::Transport)
    }

    /// Fetches a response body as text, with the same retry rules as [`Self::get_bytes`].
    pub async fn get(&self, url: &str) -> Result<String> {
        let response = self.send(url).await?;
        response.text().await.map_err(DashboardError::Transport)
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        let mut retries = 0;

        loop {
            self.rate_limiter.until_ready().await;
            tracing::debug!("GET {}", url);

            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        if retries >= self.max_retries {
                            return Err(DashboardError::RateLimitExceeded);
                        }

                        let retry_after = response
                            .headers()
                            .get("retry-after")
                            .and_then(|h| h.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .map(Duration::from_secs)
                            .unwrap_or_else(|| Self::calculate_backoff(retries));

                        tracing::warn!(
                            "Rate limit hit (429) for {}. Attempt {}/{}. Waiting for {:?} before retry.",
                            url,
                            retries + 1,
                            self.max_retries + 1,
                            retry_after
                        );
                        sleep(retry_after).await;
                        retries += 1;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    let err = DashboardError::from_response_body(status.as_u16(), &body);
                    tracing::debug!("Request to {} failed: {}", url, err);
                    return Err(err);
                }
                Err(e) => {
                    if retries >= self.max_retries {
                        return Err(DashboardError::Transport(e));
                    }
                    let backoff = Self::calculate_backoff(retries);
                    tracing::warn!(
                        "Request failed for {}: {:?}. Attempt {}/{}. Retrying in {:?}.",
                        url,
                        e,
                        retries + 1,
                        self.max_retries + 1,
                        backoff
                    );
                    sleep(backoff).await;
                    retries += 1;
                }
            }
        }
    }

    /// Returns the backend root URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
