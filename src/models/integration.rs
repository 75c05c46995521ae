//! Organization integration model.
//!
//! Only the parts needed to find an integration and rewrite its
//! `configData` are modeled; the configuration itself stays raw JSON.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::org_path;
use crate::client::{seg, SentryClient};
use crate::error::Result;
use crate::pagination::Page;
use crate::traits::{Get, List};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationIntegration {
    #[serde(deserialize_with = "super::string_or_number")]
    pub id: String,

    pub name: String,

    pub provider: IntegrationProvider,

    #[serde(default)]
    pub external_id: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    /// Provider specific configuration (`service_table`, `team_table`, ...).
    #[serde(default)]
    pub config_data: Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationProvider {
    /// `pagerduty`, `opsgenie`, `slack`, `github`, ...
    pub key: String,
    #[serde(default)]
    pub name: String,
}

/// Integrations of an organization, optionally of one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationListQuery {
    pub organization: String,
    pub provider_key: Option<String>,
}

fn integration_path(organization: &str, integration_id: &str) -> String {
    org_path(organization, &format!("integrations/{}/", seg(integration_id)))
}

#[async_trait]
impl Get for OrganizationIntegration {
    type Id = (String, String); // (organization, integration id)

    #[tracing::instrument(skip(client))]
    async fn get(
        client: &SentryClient,
        (organization, integration_id): (String, String),
    ) -> Result<Self> {
        let response = client
            .get(&integration_path(&organization, &integration_id))
            .await?;
        SentryClient::json(response).await
    }
}

#[async_trait]
impl List for OrganizationIntegration {
    type Query = IntegrationListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &SentryClient,
        query: &IntegrationListQuery,
        cursor: Option<&str>,
    ) -> Result<Page<Self>> {
        let params: Vec<(&str, &str)> = query
            .provider_key
            .as_deref()
            .map(|key| ("provider_key", key))
            .into_iter()
            .collect();
        client
            .get_page(
                &org_path(&query.organization, "integrations/"),
                params.as_slice(),
                cursor,
            )
            .await
    }
}

/// Replace the integration's `configData` with `config_data`.
#[tracing::instrument(skip(client, config_data))]
pub async fn update_integration_config(
    client: &SentryClient,
    organization: &str,
    integration_id: &str,
    config_data: &Json,
) -> Result<()> {
    client
        .post(&integration_path(organization, integration_id), config_data)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::integration_table::{read_table, ServiceTableRow};
    use serde_json::json;

    #[test]
    fn test_deserialize_integration() {
        let integration: OrganizationIntegration = serde_json::from_value(json!({
            "id": "123456",
            "name": "acme",
            "icon": null,
            "domainName": "acme.pagerduty.com",
            "provider": {"key": "pagerduty", "slug": "pagerduty", "name": "PagerDuty"},
            "status": "active",
            "configData": {
                "service_table": [
                    {"service": "web", "integration_key": "k1", "id": 7},
                    {"service": "api", "integration_key": "k2", "id": "9"}
                ]
            },
            "externalId": "ABCD"
        }))
        .unwrap();
        assert_eq!(integration.provider.key, "pagerduty");
        let rows: Vec<ServiceTableRow> = read_table(&integration.config_data).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "7");
        assert_eq!(rows[1].id, "9");
    }

    #[test]
    fn test_missing_config_data_is_null() {
        let integration: OrganizationIntegration = serde_json::from_value(json!({
            "id": 1,
            "name": "slack",
            "provider": {"key": "slack"}
        }))
        .unwrap();
        assert!(integration.config_data.is_null());
    }
}
