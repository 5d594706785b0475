//! # Backoff for the rate-limited invoice GETs
//!
//! The provider throttles the list and detail endpoints. A request is sent
//! again, after an exponentially growing delay, when it:
//!
//! - fails below HTTP (connect error, socket timeout), or
//! - comes back `429 Too Many Requests` or `503 Service Unavailable`.
//!
//! A throttled response may carry `Retry-After` in delta-seconds; the wait is
//! then the longer of that value (capped at [`MAX_RETRY_AFTER`]) and the
//! computed backoff. Every other response, success or not, goes straight back
//! to the caller. When the attempts run out the last outcome is returned as
//! is, so a final 429/503 still surfaces as a status error upstream.
//!
//! The token request never goes through here.

use std::future::Future;
use std::time::Duration;

use reqwest::{Response, StatusCode};

/// Upper bound on a provider-requested `Retry-After` wait.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

/// How often and how patiently a throttled GET is re-sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Re-sends after the first attempt. Zero disables retrying.
    pub max_retries: u32,
    /// Delay before the first re-send; doubles for each further one.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Delay before re-send number `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

fn is_throttled(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE
    )
}

fn retry_after(resp: &Response) -> Option<Duration> {
    let secs: u64 = resp
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()?;
    Some(Duration::from_secs(secs).min(MAX_RETRY_AFTER))
}

/// Send via `send`, re-sending throttled or transport-failed attempts
/// according to `policy`. `endpoint` labels the log lines.
pub(crate) async fn send_with_backoff<F, Fut>(
    policy: RetryPolicy,
    endpoint: &str,
    send: F,
) -> Result<Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let mut attempt = 0u32;
    loop {
        let outcome = send().await;
        let delay = match &outcome {
            Ok(resp) if is_throttled(resp.status()) => {
                let backoff = policy.backoff(attempt);
                retry_after(resp).map_or(backoff, |asked| asked.max(backoff))
            }
            Ok(_) => return outcome,
            Err(_) => policy.backoff(attempt),
        };
        if attempt >= policy.max_retries {
            return outcome;
        }

        match outcome {
            Ok(resp) => tracing::warn!(
                endpoint,
                status = resp.status().as_u16(),
                attempt = attempt + 1,
                max_retries = policy.max_retries,
                "provider throttled request, retrying in {delay:?}"
            ),
            Err(e) => tracing::warn!(
                endpoint,
                attempt = attempt + 1,
                max_retries = policy.max_retries,
                "provider request failed, retrying in {delay:?}: {e}"
            ),
        }
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
