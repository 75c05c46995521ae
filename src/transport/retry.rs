//! Retrying transport with rate-limit aware backoff.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use reqwest::{Request, Response, StatusCode};

use super::Transport;
use crate::error::{Result, SentryError};

/// Response header with the epoch second at which the rate limit window resets.
pub const RATE_LIMIT_RESET_HEADER: &str = "x-sentry-rate-limit-reset";

/// Retry bounds and backoff window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base wait for exponential backoff.
    pub min_wait: Duration,
    /// Upper bound for exponential backoff.
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            min_wait: Duration::from_secs(1),
            max_wait: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Exponential backoff for the given zero-based attempt, with jitter.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(16));
        let base = self.min_wait.saturating_mul(factor).min(self.max_wait);
        let jitter = rand::thread_rng().gen_range(0.75..1.25);
        base.mul_f64(jitter).min(self.max_wait)
    }

    /// How long to wait before retrying after `response`, if it is retryable.
    fn wait_for_response(&self, attempt: u32, response: &Response) -> Option<Duration> {
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Some(reset_wait(response).unwrap_or_else(|| self.backoff(attempt)));
        }
        is_retryable_status(status).then(|| self.backoff(attempt))
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || (status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED)
}

fn is_retryable_error(err: &SentryError) -> bool {
    matches!(err, SentryError::Http(e) if e.is_connect() || e.is_timeout())
}

/// Time remaining until the reset instant advertised by a 429 response.
fn reset_wait(response: &Response) -> Option<Duration> {
    let reset = response
        .headers()
        .get(RATE_LIMIT_RESET_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()?;
    let reset_ms = (reset * 1000.0).ceil() as i64;
    let remaining = reset_ms - Utc::now().timestamp_millis();
    (remaining > 0).then(|| Duration::from_millis(remaining as u64))
}

/// Retries 429s, 5xx responses (except 501) and connection failures.
///
/// When attempts run out the last response or transport error is returned
/// unchanged so callers see exactly what the Service said.
#[derive(Debug)]
pub struct RateLimitRetry<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> RateLimitRetry<T> {
    #[must_use]
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<T: Transport> Transport for RateLimitRetry<T> {
    async fn send(&self, request: Request) -> Result<Response> {
        let mut pending = request;
        let mut attempt: u32 = 0;

        loop {
            let retry = if attempt < self.policy.max_retries {
                pending.try_clone()
            } else {
                None
            };
            let outcome = self.inner.send(pending).await;

            let Some(next) = retry else {
                return outcome;
            };
            let wait = match &outcome {
                Ok(response) => self.policy.wait_for_response(attempt, response),
                Err(err) if is_retryable_error(err) => Some(self.policy.backoff(attempt)),
                Err(_) => None,
            };
            let Some(wait) = wait else {
                return outcome;
            };

            tracing::debug!(
                attempt = attempt + 1,
                wait_ms = wait.as_millis() as u64,
                "retrying sentry request"
            );
            drop(outcome);
            tokio::time::sleep(wait).await;
            pending = next;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable_status(StatusCode::NOT_IMPLEMENTED));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::OK));
    }

    #[test]
    fn test_backoff_is_bounded() {
        let policy = RetryPolicy::default();
        for attempt in 0..10 {
            let wait = policy.backoff(attempt);
            assert!(wait <= policy.max_wait, "attempt {attempt} waited {wait:?}");
        }
        let first = policy.backoff(0);
        assert!(first >= Duration::from_millis(750) && first < Duration::from_millis(1250));
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 4);
        assert_eq!(policy.min_wait, Duration::from_secs(1));
        assert_eq!(policy.max_wait, Duration::from_secs(30));
        assert_eq!(RetryPolicy::none().max_retries, 0);
    }
}
