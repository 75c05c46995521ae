//! Provider configuration.
//!
//! The provider takes two optional settings. Explicit configuration wins;
//! otherwise the environment is consulted:
//!
//! - `token`: falls back to `SENTRY_AUTH_TOKEN`, then `SENTRY_TOKEN`
//! - `base_url`: falls back to `SENTRY_BASE_URL`, then `https://sentry.io/api/`

use std::env;

use crate::attr::Value;
use crate::error::{Result, SentryError};

/// Default Sentry API root.
pub const DEFAULT_BASE_URL: &str = "https://sentry.io/api/";

/// Environment variables checked for the token, in order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["SENTRY_AUTH_TOKEN", "SENTRY_TOKEN"];

/// Environment variable overriding the API root.
pub const BASE_URL_ENV_VAR: &str = "SENTRY_BASE_URL";

/// Provider configuration as declared by the user.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Authentication token (sensitive).
    pub token: Value<String>,
    /// API root, e.g. `https://sentry.example.com/api/`.
    pub base_url: Value<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("token", &self.token.as_known().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Fully resolved connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub token: String,
    pub base_url: String,
}

impl std::fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ProviderConfig {
    /// Resolve against the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is configured anywhere.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.resolve_with(|key| env::var(key).ok())
    }

    /// Resolve using a custom environment lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is configured anywhere.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<ResolvedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(key))
                .find(|value| !value.is_empty())
        };

        let token = self
            .token
            .as_known()
            .cloned()
            .or_else(|| from_env(&TOKEN_ENV_VARS))
            .ok_or_else(|| {
                SentryError::ConfigMissing(
                    "set `token` or the SENTRY_AUTH_TOKEN environment variable".to_string(),
                )
            })?;

        let base_url = self
            .base_url
            .as_known()
            .cloned()
            .or_else(|| from_env(&[BASE_URL_ENV_VAR]))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(ResolvedConfig { token, base_url })
    }
}
