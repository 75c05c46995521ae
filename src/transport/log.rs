//! Request tracing.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Request, Response};

use super::Transport;
use crate::error::Result;

/// Emits a debug event per request with method, URL, status and latency.
///
/// Headers and bodies are never logged.
#[derive(Debug)]
pub struct RequestLog<T> {
    inner: T,
}

impl<T> RequestLog<T> {
    #[must_use]
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: Transport> Transport for RequestLog<T> {
    async fn send(&self, request: Request) -> Result<Response> {
        let method = request.method().clone();
        let url = request.url().clone();
        let started = Instant::now();

        let result = self.inner.send(request).await;
        let elapsed_ms = started.elapsed().as_millis();
        match &result {
            Ok(response) => tracing::debug!(
                %method,
                %url,
                status = response.status().as_u16(),
                elapsed_ms,
                "sentry request"
            ),
            Err(err) => tracing::debug!(%method, %url, elapsed_ms, error = %err, "sentry request failed"),
        }
        result
    }
}
