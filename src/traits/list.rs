//! List trait for fetching collections of entities.

use async_trait::async_trait;

use crate::client::SentryClient;
use crate::error::Result;
use crate::pagination::Page;

/// List entities from a cursor-paginated endpoint.
///
/// Implementors only fetch a single page; [`List::list_all`] drives the
/// cursor loop until the Service reports no further results.
///
/// # Example
///
/// ```ignore
/// use sentry_provider::{SentryClient, List};
/// use sentry_provider::models::{ClientKey, ProjectScope};
///
/// let client = SentryClient::from_env()?;
/// let scope = ProjectScope::new("my-org", "my-project");
///
/// // Fetch a single page
/// let page = ClientKey::list_page(&client, &scope, None).await?;
///
/// // Fetch all pages
/// let keys = ClientKey::list_all(&client, &scope).await?;
/// ```
#[async_trait]
pub trait List: Sized + Send {
    /// Parameters locating the collection (organization, project, filters).
    type Query: Send + Sync;

    /// Fetch one page starting at `cursor` (or the first page).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list_page(
        client: &SentryClient,
        query: &Self::Query,
        cursor: Option<&str>,
    ) -> Result<Page<Self>>;

    /// Fetch every page and concatenate the items in order.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails; nothing is returned
    /// from a partially drained listing.
    async fn list_all(client: &SentryClient, query: &Self::Query) -> Result<Vec<Self>> {
        let mut all_items = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let result = Self::list_page(client, query, cursor.as_deref()).await?;
            pages += 1;
            all_items.extend(result.items);

            match result.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::debug!(pages, items = all_items.len(), "drained listing");
        Ok(all_items)
    }
}
