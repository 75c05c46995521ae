//! User-Agent injection.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::{Request, Response};

use super::Transport;
use crate::error::{Result, SentryError};

/// Identifies this crate to the Service.
pub const DEFAULT_USER_AGENT: &str = concat!("sentry-provider/", env!("CARGO_PKG_VERSION"));

/// Build a User-Agent, optionally prefixed with the host's own product token.
#[must_use]
pub fn user_agent_string(host: Option<(&str, &str)>) -> String {
    match host {
        Some((name, version)) => format!("{name}/{version} {DEFAULT_USER_AGENT}"),
        None => DEFAULT_USER_AGENT.to_string(),
    }
}

/// Sets a fixed `User-Agent` header on every request.
#[derive(Debug)]
pub struct UserAgent<T> {
    inner: T,
    value: HeaderValue,
}

impl<T> UserAgent<T> {
    /// Wrap `inner` with the given product string.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not a valid header value.
    pub fn new(inner: T, value: &str) -> Result<Self> {
        let value = HeaderValue::from_str(value)
            .map_err(|_| SentryError::ConfigMissing(format!("invalid user agent: {value}")))?;
        Ok(Self { inner, value })
    }
}

#[async_trait]
impl<T: Transport> Transport for UserAgent<T> {
    async fn send(&self, mut request: Request) -> Result<Response> {
        request.headers_mut().insert(USER_AGENT, self.value.clone());
        self.inner.send(request).await
    }
}
