//! Get trait for fetching single entities.

use async_trait::async_trait;

use crate::client::SentryClient;
use crate::error::Result;

/// Fetch a single entity by ID.
///
/// # Example
///
/// ```ignore
/// use sentry_provider::{SentryClient, Get};
/// use sentry_provider::models::Team;
///
/// let client = SentryClient::from_env()?;
/// let team = Team::get(&client, ("my-org".into(), "backend".into())).await?;
/// ```
#[async_trait]
pub trait Get: Sized {
    /// The identifier type, usually the organization slug plus the entity key.
    type Id: Send;

    /// Fetch the entity by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn get(client: &SentryClient, id: Self::Id) -> Result<Self>;
}
