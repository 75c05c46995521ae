//! Bearer token injection.

use std::fmt;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response};

use super::Transport;
use crate::error::{Result, SentryError};

/// Sets `Authorization: Bearer <token>` on every request.
pub struct BearerAuth<T> {
    inner: T,
    header: HeaderValue,
}

impl<T> BearerAuth<T> {
    /// Wrap `inner`, authenticating with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token contains characters that are not
    /// allowed in an HTTP header.
    pub fn new(inner: T, token: &str) -> Result<Self> {
        let mut header = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            SentryError::ConfigMissing("token contains invalid header characters".to_string())
        })?;
        header.set_sensitive(true);
        Ok(Self { inner, header })
    }
}

impl<T: fmt::Debug> fmt::Debug for BearerAuth<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: Transport> Transport for BearerAuth<T> {
    async fn send(&self, mut request: Request) -> Result<Response> {
        request
            .headers_mut()
            .insert(AUTHORIZATION, self.header.clone());
        self.inner.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpTransport;

    #[test]
    fn test_debug_hides_token() {
        let auth = BearerAuth::new(HttpTransport::new(reqwest::Client::new()), "sntrys_secret")
            .unwrap();
        let debug = format!("{auth:?}");
        assert!(debug.contains("BearerAuth"));
        assert!(!debug.contains("sntrys_secret"));
    }

    #[test]
    fn test_rejects_newline_in_token() {
        let result = BearerAuth::new(HttpTransport::new(reqwest::Client::new()), "bad\ntoken");
        assert!(matches!(result, Err(SentryError::ConfigMissing(_))));
    }
}
