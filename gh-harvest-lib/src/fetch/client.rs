//! GitHub API client
//!
//! Performs a single logical GET per call and classifies the response. Rate-limited
//! responses are retried after a fixed delay, up to a bounded number of retries.

use chrono::{DateTime, Utc};
use core::time::Duration;
use ohno::bail;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

const LOG_TARGET: &str = "    client";
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Upper bound on a server-requested `Retry-After` wait.
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(3600);

/// Unrecoverable outcome of a [`Client::fetch`] call.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("rate limit exceeded, max retries reached after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("GET {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// How rate-limited requests are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed on top of the first request.
    pub max_retries: u32,

    /// Wait between a rate-limited response and the next attempt.
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(10),
        }
    }
}

/// Rate limit information from response headers
#[derive(Debug, Clone, Copy)]
pub struct RateLimitInfo {
    pub remaining: usize,
    pub reset_at: DateTime<Utc>,
}

/// GitHub REST API client.
///
/// Cheap to clone and safe to share between workers; the only shared state is the
/// underlying connection pool and read-only settings.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl Client {
    /// Create a client that authenticates every request with `token`.
    pub fn new(
        token: &SecretString,
        base_url: Url,
        user_agent: &str,
        request_timeout: Duration,
        retry: RetryPolicy,
    ) -> crate::Result<Self> {
        if base_url.cannot_be_a_base() {
            bail!("API base URL '{base_url}' cannot be used as a base URL");
        }

        let mut auth_val = HeaderValue::from_str(&format!("token {}", token.expose_secret()))?;
        auth_val.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(AUTHORIZATION, auth_val);
        let _ = headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(request_timeout)
            .build()?;

        Ok(Self { http, base_url, retry })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Build an API URL by appending percent-encoded path segments to the base URL.
    #[must_use]
    pub fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            let _ = path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET `url` and decode the JSON body.
    ///
    /// Returns `Ok(None)` when the resource does not exist (404). Rate-limited responses
    /// (403, 429) are retried up to [`RetryPolicy::max_retries`] times; any other failure
    /// is returned immediately.
    pub async fn fetch<T: DeserializeOwned>(&self, url: &Url) -> Result<Option<T>, FetchError> {
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);

            let response = self.http.get(url.clone()).send().await.map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

            let status = response.status();
            if status.is_success() {
                let body = response.bytes().await.map_err(|e| FetchError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

                return serde_json::from_slice(&body).map(Some).map_err(|e| FetchError::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                });
            }

            if status == StatusCode::NOT_FOUND {
                log::warn!(target: LOG_TARGET, "Resource not found: {url}");
                return Ok(None);
            }

            if is_rate_limited(status) {
                if attempt > self.retry.max_retries {
                    log::warn!(target: LOG_TARGET, "Rate limit exceeded for {url}, giving up after {attempt} attempts");
                    return Err(FetchError::RateLimitExceeded { attempts: attempt });
                }

                if let Some(rl) = extract_rate_limit_from_headers(response.headers()) {
                    log::debug!(
                        target: LOG_TARGET,
                        "GitHub API rate limit: {} remaining, resets at {}",
                        rl.remaining,
                        rl.reset_at.with_timezone(&chrono::Local).format("%T")
                    );
                }

                let delay = self.retry_delay_for(response.headers());
                log::warn!(
                    target: LOG_TARGET,
                    "Rate limit exceeded for {url}, retrying in {delay:?} (retry {attempt} of {})",
                    self.retry.max_retries
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
    }

    /// The wait before retrying, honoring a longer `Retry-After` if the server sent one.
    fn retry_delay_for(&self, headers: &HeaderMap) -> Duration {
        parse_retry_after(headers).map_or(self.retry.retry_delay, |server_delay| {
            server_delay.min(MAX_RATE_LIMIT_WAIT).max(self.retry.retry_delay)
        })
    }
}

fn is_rate_limited(status: StatusCode) -> bool {
    status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS
}

/// Parse the `Retry-After` header value as seconds.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let s = headers.get(RETRY_AFTER).and_then(|h| h.to_str().ok())?;
    s.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Extract rate limit information from API response headers
fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.parse::<usize>().ok()?;

    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;

    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo { remaining, reset_at })
}
