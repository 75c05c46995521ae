//! Data-source readers.
//!
//! A data source takes the configuration the user wrote, looks the
//! matching object up on the Service and returns the configuration filled
//! in. Unlike resources, a missing object is an error.

mod all_projects;
mod client_key;
mod issue_alert;
mod organization;
mod organization_integration;
mod organization_member;
mod project;
mod team;

pub use all_projects::*;
pub use client_key::*;
pub use issue_alert::*;
pub use organization::*;
pub use organization_integration::*;
pub use organization_member::*;
pub use project::*;
pub use team::*;

use async_trait::async_trait;

use crate::diagnostics::{from_api_error, not_found, Diagnostic};
use crate::error::Result;
use crate::resources::Outcome;
use crate::schema::Schema;

#[async_trait]
pub trait DataSource: Send + Sync {
    type Model: Clone + Send + Sync + 'static;

    /// Type name without the `sentry_` prefix.
    const TYPE_NAME: &'static str;

    fn schema() -> Schema;

    async fn read(&self, config: Self::Model) -> Outcome<Self::Model>;
}

/// Map a lookup result, turning 404 into a not found diagnostic.
pub(crate) fn lookup<T>(result: Result<T>, what: &str) -> std::result::Result<T, Diagnostic> {
    match result {
        Ok(value) => Ok(value),
        Err(err) if err.is_not_found() => Err(not_found(what)),
        Err(err) => Err(from_api_error("read", &err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SentryError;

    #[test]
    fn test_lookup_not_found() {
        let missing: Result<()> = Err(SentryError::Api {
            status: 404,
            body: "{}".to_string(),
        });
        let diagnostic = lookup(missing, "team").unwrap_err();
        assert_eq!(diagnostic.detail.as_deref(), Some("No matching team found"));

        let failure: Result<()> = Err(SentryError::Api {
            status: 403,
            body: "denied".to_string(),
        });
        let diagnostic = lookup(failure, "team").unwrap_err();
        assert_eq!(
            diagnostic.detail.as_deref(),
            Some("Unable to read, got status 403: denied")
        );
    }
}
