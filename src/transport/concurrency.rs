//! Self-calibrating concurrency gate.
//!
//! The Service advertises how many requests an organization may have in
//! flight through a response header. Until a response carrying that header
//! arrives, requests are sent one at a time. Once a positive limit is seen a
//! semaphore of that capacity is installed and every later request holds a
//! permit for its whole round trip. The limit never changes afterwards.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Request, Response};
use tokio::sync::{Mutex, Semaphore};

use super::Transport;
use crate::error::{Result, SentryError};

/// Response header carrying the organization's concurrent request limit.
pub const CONCURRENT_LIMIT_HEADER: &str = "x-sentry-rate-limit-concurrentlimit";

#[derive(Debug)]
struct Gate {
    limit: usize,
    semaphore: Arc<Semaphore>,
}

/// Limits in-flight requests to the capacity discovered from the Service.
#[derive(Debug)]
pub struct ConcurrencyLimit<T> {
    inner: T,
    gate: OnceLock<Gate>,
    calibration: Mutex<()>,
}

impl<T> ConcurrencyLimit<T> {
    #[must_use]
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            gate: OnceLock::new(),
            calibration: Mutex::new(()),
        }
    }

    /// The calibrated limit, once a response has advertised one.
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.gate.get().map(|gate| gate.limit)
    }
}

fn concurrent_limit(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONCURRENT_LIMIT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|limit| *limit > 0)
        .map(|limit| limit.min(Semaphore::MAX_PERMITS))
}

impl<T: Transport> ConcurrencyLimit<T> {
    async fn send_gated(&self, gate: &Gate, request: Request) -> Result<Response> {
        let _permit = gate
            .semaphore
            .acquire()
            .await
            .map_err(|e| SentryError::Transport(e.to_string()))?;
        self.inner.send(request).await
    }
}

#[async_trait]
impl<T: Transport> Transport for ConcurrencyLimit<T> {
    async fn send(&self, request: Request) -> Result<Response> {
        if let Some(gate) = self.gate.get() {
            return self.send_gated(gate, request).await;
        }

        let guard = self.calibration.lock().await;
        // Another request may have calibrated while we waited.
        if let Some(gate) = self.gate.get() {
            drop(guard);
            return self.send_gated(gate, request).await;
        }

        let response = self.inner.send(request).await?;
        if let Some(limit) = concurrent_limit(response.headers()) {
            tracing::debug!(limit, "calibrated concurrency limit");
            let _ = self.gate.set(Gate {
                limit,
                semaphore: Arc::new(Semaphore::new(limit)),
            });
        }
        drop(guard);
        Ok(response)
    }
}
