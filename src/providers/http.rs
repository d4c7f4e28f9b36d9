//! Shared HTTP plumbing for explorer and generation clients
//!
//! - Every client carries a request timeout
//! - gzip enabled, custom User-Agent
//! - One retry with jitter on transient failures (timeout / connect).
//!   HTTP error statuses and error envelopes are never retried.

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::constants::{
    MAX_TRANSIENT_RETRIES, RETRY_BASE_DELAY_MS, RETRY_JITTER_PERCENT,
    USER_AGENT as USER_AGENT_CONST,
};

/// Build HTTP client with custom headers and a hard timeout
pub fn build_client(timeout: Duration) -> AppResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .gzip(true)
        .build()
        .map_err(|e| {
            AppError::with_source(ErrorCode::ConfigInvalidValue, "Failed to build HTTP client", e)
        })
}

/// Timeouts and refused connections are worth one more attempt
pub fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

/// Base delay with random jitter (±RETRY_JITTER_PERCENT)
pub fn retry_delay() -> Duration {
    let jitter_range = (RETRY_BASE_DELAY_MS * RETRY_JITTER_PERCENT) / 100;
    let jitter: i64 =
        rand::thread_rng().gen_range(-(jitter_range as i64)..=(jitter_range as i64));
    Duration::from_millis((RETRY_BASE_DELAY_MS as i64 + jitter).max(0) as u64)
}

/// Send a request, retrying once on transient failure.
/// `make_request` is called per attempt since a `RequestBuilder` is consumed by `send`.
pub async fn send_with_retry<F>(label: &str, make_request: F) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;
    loop {
        match make_request().send().await {
            Ok(response) => return Ok(response),
            Err(e) if is_transient(&e) && attempt < MAX_TRANSIENT_RETRIES => {
                attempt += 1;
                let delay = retry_delay();
                warn!(
                    "⏳ {} transient failure ({}), retry {}/{} in {}ms",
                    label,
                    e,
                    attempt,
                    MAX_TRANSIENT_RETRIES,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                debug!("{} request failed: {}", label, e);
                return Err(e);
            }
        }
    }
}
