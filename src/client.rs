//! Sentry API client.
//!
//! Low-level client that builds requests against the API root and sends
//! them through the [transport stack](crate::transport). Entity-specific
//! operations live next to the wire models in [`crate::models`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::{ProviderConfig, DEFAULT_BASE_URL};
use crate::error::{Result, SentryError};
use crate::pagination::{parse_next_cursor, Page};
use crate::transport::{self, HttpTransport, RetryPolicy, Transport, DEFAULT_USER_AGENT};

/// Sentry API client.
///
/// This struct is cheaply cloneable; clones share the connection pool and
/// the calibrated concurrency gate.
///
/// # Example
///
/// ```no_run
/// use sentry_provider::SentryClient;
///
/// # async fn example() -> sentry_provider::Result<()> {
/// // Resolve token and base URL from the environment
/// let client = SentryClient::from_env()?;
///
/// // Or configure manually
/// let client = SentryClient::new("sntrys_token", "https://sentry.io/api/")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SentryClient {
    http: Client,
    transport: Arc<dyn Transport>,
    base_url: Arc<Url>,
}

impl std::fmt::Debug for SentryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentryClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Builder for [`SentryClient`].
#[derive(Clone)]
pub struct SentryClientBuilder {
    token: String,
    base_url: String,
    user_agent: String,
    retry: RetryPolicy,
    timeout: Duration,
}

impl std::fmt::Debug for SentryClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentryClientBuilder")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl SentryClientBuilder {
    /// Override the API root.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the User-Agent header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client and its transport stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or token is invalid.
    pub fn build(self) -> Result<SentryClient> {
        let http = Client::builder()
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(self.timeout)
            .build()
            .map_err(SentryError::Http)?;

        let stack = transport::stack(
            HttpTransport::new(http.clone()),
            &self.token,
            &self.user_agent,
            self.retry,
        )?;

        SentryClient::with_transport(http, Arc::new(stack), &self.base_url)
    }
}

impl SentryClient {
    /// Create a client from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is available.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&ProviderConfig::default())
    }

    /// Create a client from provider configuration, falling back to the
    /// environment for anything left unset.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is available or the base URL is invalid.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let resolved = config.resolve()?;
        Self::builder(resolved.token)
            .base_url(resolved.base_url)
            .build()
    }

    /// Create a client with the provided token and base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        Self::builder(token).base_url(base_url).build()
    }

    /// Start building a client.
    #[must_use]
    pub fn builder(token: impl Into<String>) -> SentryClientBuilder {
        SentryClientBuilder {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(300),
        }
    }

    /// Create a client around a caller-provided transport.
    ///
    /// `http` is only used to build requests; dispatch always goes through
    /// `transport`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn with_transport(
        http: Client,
        transport: Arc<dyn Transport>,
        base_url: &str,
    ) -> Result<Self> {
        // Ensure base URL ends with /
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&base_url_str)?;

        Ok(Self {
            http,
            transport,
            base_url: Arc::new(base_url),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        Ok(self.http.request(method, url))
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build().map_err(SentryError::Http)?;
        let response = self.transport.send(request).await?;
        Self::check_response(response).await
    }

    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Response> {
        self.execute(self.request(Method::GET, path)?).await
    }

    /// Make a GET request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        self.execute(self.request(Method::GET, path)?.query(query))
            .await
    }

    /// Make a POST request with JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        self.execute(self.request(Method::POST, path)?.json(body))
            .await
    }

    /// Make a POST request without a body.
    #[tracing::instrument(skip(self))]
    pub async fn post_empty(&self, path: &str) -> Result<Response> {
        self.execute(self.request(Method::POST, path)?).await
    }

    /// Make a PUT request with JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        self.execute(self.request(Method::PUT, path)?.json(body))
            .await
    }

    /// Make a PUT request with JSON body and query parameters.
    #[tracing::instrument(skip(self, query, body))]
    pub async fn put_with_query<Q: Serialize + ?Sized, B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
        body: &B,
    ) -> Result<Response> {
        self.execute(self.request(Method::PUT, path)?.query(query).json(body))
            .await
    }

    /// Make a DELETE request.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> Result<Response> {
        self.execute(self.request(Method::DELETE, path)?).await
    }

    /// Make a DELETE request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn delete_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        self.execute(self.request(Method::DELETE, path)?.query(query))
            .await
    }

    /// Make a DELETE request with JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn delete_with_body<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response> {
        self.execute(self.request(Method::DELETE, path)?.json(body))
            .await
    }

    /// Fetch one page of a cursor-paginated list endpoint.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_page<T, Q>(&self, path: &str, query: &Q, cursor: Option<&str>) -> Result<Page<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let mut builder = self.request(Method::GET, path)?.query(query);
        if let Some(cursor) = cursor {
            builder = builder.query(&[("cursor", cursor)]);
        }
        let response = self.execute(builder).await?;
        let next_cursor = parse_next_cursor(response.headers());
        let items: Vec<T> = Self::json(response).await?;
        Ok(Page::new(items, next_cursor))
    }

    /// Issue the health check request against the API root.
    ///
    /// Unlike the other calls this returns the raw response, whatever its
    /// status, so callers can tell a bad base URL from a bad token.
    #[tracing::instrument(skip(self))]
    pub async fn health_check(&self) -> Result<Response> {
        let request = self
            .request(Method::GET, "0/")?
            .build()
            .map_err(SentryError::Http)?;
        self.transport.send(request).await
    }

    /// Decode a JSON response body.
    pub async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await.map_err(SentryError::Http)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = Self::extract_error_message(response).await;
        Err(SentryError::Api {
            status: status.as_u16(),
            body,
        })
    }

    /// Extract error message from a failed response.
    async fn extract_error_message(response: Response) -> String {
        let status = response.status();
        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => return format!("HTTP {status}"),
        };

        // Sentry reports most failures as {"detail": "..."}
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
            if let Some(msg) = json.get("detail").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
        }

        body
    }
}

/// Percent-encode a single path segment.
pub(crate) fn seg(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_debug() {
        let client = SentryClient::new("test-token", "https://sentry.io/api/").unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("SentryClient"));
        assert!(debug.contains("base_url"));
        // Token should not be in debug output
        assert!(!debug.contains("test-token"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client1 = SentryClient::new("token", "https://sentry.example.com/api").unwrap();
        let client2 = SentryClient::new("token", "https://sentry.example.com/api/").unwrap();
        assert_eq!(client1.base_url().as_str(), client2.base_url().as_str());
        assert_eq!(
            client1.base_url().join("0/organizations/").unwrap().as_str(),
            "https://sentry.example.com/api/0/organizations/"
        );
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(seg("my-org"), "my-org");
        assert_eq!(seg("a/b"), "a%2Fb");
    }
}
