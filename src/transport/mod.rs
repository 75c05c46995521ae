//! Composable HTTP transport stack.
//!
//! Every request leaves the process through a chain of [`Transport`]
//! layers, each wrapping the next one:
//!
//! ```text
//! RateLimitRetry -> ConcurrencyLimit -> UserAgent -> BearerAuth -> RequestLog -> HttpTransport
//! ```
//!
//! The outermost layer sees the request first. Layers only inject headers
//! or delay dispatch; bodies are passed through untouched. Each layer is
//! generic over its inner transport so it can be tested against a fake.

mod auth;
mod concurrency;
mod log;
mod retry;
mod user_agent;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Request, Response};

use crate::error::{SentryError, Result};

pub use auth::BearerAuth;
pub use concurrency::{ConcurrencyLimit, CONCURRENT_LIMIT_HEADER};
pub use log::RequestLog;
pub use retry::{RateLimitRetry, RetryPolicy, RATE_LIMIT_RESET_HEADER};
pub use user_agent::{user_agent_string, UserAgent, DEFAULT_USER_AGENT};

/// A single hop in the request pipeline.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Dispatch a request and return the raw response, whatever its status.
    async fn send(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: Request) -> Result<Response> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&self, request: Request) -> Result<Response> {
        (**self).send(request).await
    }
}

/// Base transport executing requests on a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Wrap an already configured client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The underlying client, used to build requests.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        self.client
            .execute(request)
            .await
            .map_err(SentryError::Http)
    }
}

/// Assemble the standard pipeline around a base transport.
///
/// # Errors
///
/// Returns an error if the token cannot be encoded as a header value.
pub fn stack<T>(
    base: T,
    token: &str,
    user_agent: &str,
    policy: RetryPolicy,
) -> Result<RateLimitRetry<ConcurrencyLimit<UserAgent<BearerAuth<RequestLog<T>>>>>>
where
    T: Transport,
{
    let logged = RequestLog::new(base);
    let authed = BearerAuth::new(logged, token)?;
    let identified = UserAgent::new(authed, user_agent)?;
    let gated = ConcurrencyLimit::new(identified);
    Ok(RateLimitRetry::new(gated, policy))
}
