//! Organization repository model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::org_path;
use crate::client::{seg, SentryClient};
use crate::error::Result;
use crate::pagination::Page;
use crate::traits::List;

/// Prefix the Service puts in front of integration provider keys.
pub const INTEGRATION_PROVIDER_PREFIX: &str = "integrations:";

/// A source code repository connected through an integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRepository {
    #[serde(deserialize_with = "super::string_or_number")]
    pub id: String,

    pub name: String,

    pub provider: RepositoryProvider,

    #[serde(default, deserialize_with = "super::opt_string_or_number")]
    pub integration_id: Option<String>,

    /// The external identifier; some providers report it as a number.
    #[serde(default)]
    pub external_slug: Json,

    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryProvider {
    /// `integrations:<type>`.
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl OrganizationRepository {
    /// The integration type with the `integrations:` prefix removed.
    pub fn integration_type(&self) -> &str {
        self.provider
            .id
            .strip_prefix(INTEGRATION_PROVIDER_PREFIX)
            .unwrap_or(&self.provider.id)
    }

    /// The external identifier as text.
    ///
    /// # Errors
    ///
    /// Fails when the identifier is neither a string nor a number.
    pub fn identifier(&self) -> std::result::Result<String, String> {
        match &self.external_slug {
            Json::String(s) => Ok(s.clone()),
            Json::Number(n) => Ok(n.to_string()),
            other => Err(format!("failed to unmarshal identifier: {other}")),
        }
    }
}

/// Body for connecting a repository.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRepositoryRequest {
    /// `integrations:<type>`.
    pub provider: String,
    /// Integration id.
    pub installation: String,
    pub identifier: String,
}

impl CreateRepositoryRequest {
    pub fn new(integration_type: &str, integration_id: &str, identifier: &str) -> Self {
        Self {
            provider: format!("{INTEGRATION_PROVIDER_PREFIX}{integration_type}"),
            installation: integration_id.to_string(),
            identifier: identifier.to_string(),
        }
    }
}

/// Repositories of an organization, optionally narrowed to one integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryListQuery {
    pub organization: String,
    pub integration_id: Option<String>,
}

#[async_trait]
impl List for OrganizationRepository {
    type Query = RepositoryListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &SentryClient,
        query: &RepositoryListQuery,
        cursor: Option<&str>,
    ) -> Result<Page<Self>> {
        let params: Vec<(&str, &str)> = query
            .integration_id
            .as_deref()
            .map(|id| ("integration_id", id))
            .into_iter()
            .collect();
        client
            .get_page(&org_path(&query.organization, "repos/"), params.as_slice(), cursor)
            .await
    }
}

#[tracing::instrument(skip(client, request))]
pub async fn create_repository(
    client: &SentryClient,
    organization: &str,
    request: &CreateRepositoryRequest,
) -> Result<OrganizationRepository> {
    let response = client.post(&org_path(organization, "repos/"), request).await?;
    SentryClient::json(response).await
}

#[tracing::instrument(skip(client))]
pub async fn delete_repository(client: &SentryClient, organization: &str, repo_id: &str) -> Result<()> {
    client
        .delete(&org_path(organization, &format!("repos/{}/", seg(repo_id))))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_repository() {
        let repo: OrganizationRepository = serde_json::from_value(json!({
            "id": "4",
            "name": "acme/web",
            "url": "https://github.com/acme/web",
            "provider": {"id": "integrations:github", "name": "GitHub"},
            "status": "active",
            "integrationId": "12",
            "externalSlug": "acme/web"
        }))
        .unwrap();
        assert_eq!(repo.integration_type(), "github");
        assert_eq!(repo.integration_id.as_deref(), Some("12"));
        assert_eq!(repo.identifier().unwrap(), "acme/web");
    }

    #[test]
    fn test_numeric_identifier() {
        let repo: OrganizationRepository = serde_json::from_value(json!({
            "id": 5,
            "name": "web",
            "provider": {"id": "integrations:gitlab"},
            "externalSlug": 123456
        }))
        .unwrap();
        assert_eq!(repo.identifier().unwrap(), "123456");
    }

    #[test]
    fn test_create_request() {
        let body = serde_json::to_value(CreateRepositoryRequest::new("github", "12", "acme/web")).unwrap();
        assert_eq!(
            body,
            json!({"provider": "integrations:github", "installation": "12", "identifier": "acme/web"})
        );
    }
}
