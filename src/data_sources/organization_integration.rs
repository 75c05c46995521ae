use async_trait::async_trait;

use super::DataSource;
use crate::attr::Value;
use crate::client::SentryClient;
use crate::diagnostics::{client_error, Diagnostic};
use crate::models::{IntegrationListQuery, OrganizationIntegration};
use crate::resources::{known_str, try_outcome, Outcome};
use crate::schema::{Attribute, Schema};
use crate::traits::List;

/// `sentry_organization_integration`: the one integration of a provider
/// with the given name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizationIntegrationDataModel {
    pub id: Value<String>,
    pub internal_id: Value<String>,
    pub organization: Value<String>,
    pub provider_key: Value<String>,
    pub name: Value<String>,
}

impl OrganizationIntegrationDataModel {
    pub fn fill(&mut self, organization: &str, integration: &OrganizationIntegration) {
        self.id = Value::known(integration.id.as_str());
        self.internal_id = Value::known(integration.id.as_str());
        self.organization = Value::known(organization);
        self.provider_key = Value::known(integration.provider.key.as_str());
        self.name = Value::known(integration.name.as_str());
    }
}

/// The integration named `name`; exactly one must match.
pub fn select_integration<'a>(
    integrations: &'a [OrganizationIntegration],
    name: &str,
) -> Result<&'a OrganizationIntegration, Diagnostic> {
    let mut matched = integrations.iter().filter(|integration| integration.name == name);
    match (matched.next(), matched.next()) {
        (Some(integration), None) => Ok(integration),
        (None, _) => Err(Diagnostic::error("Not found").with_detail("No matching organization integrations found")),
        (Some(_), Some(_)) => {
            Err(Diagnostic::error("Not unique").with_detail("More than one matching organization integration found"))
        }
    }
}

pub struct OrganizationIntegrationDataSource {
    client: SentryClient,
}

impl OrganizationIntegrationDataSource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for OrganizationIntegrationDataSource {
    type Model = OrganizationIntegrationDataModel;

    const TYPE_NAME: &'static str = "organization_integration";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string().with_description("The ID of this integration."))
            .with_attribute(
                "internal_id",
                Attribute::computed_string()
                    .deprecated("This field is deprecated and will be removed in a future version. Use `id` instead.")
                    .with_description("The internal ID for this organization integration."),
            )
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "provider_key",
                Attribute::required_string()
                    .with_description("Specific integration provider to filter by such as `slack`, `pagerduty` or `opsgenie`."),
            )
            .with_attribute(
                "name",
                Attribute::required_string().with_description("The name of the organization integration."),
            )
    }

    async fn read(&self, mut config: OrganizationIntegrationDataModel) -> Outcome<OrganizationIntegrationDataModel> {
        let organization = try_outcome!(known_str(&config.organization, "organization")).to_string();
        let name = try_outcome!(known_str(&config.name, "name")).to_string();
        let query = IntegrationListQuery {
            organization: organization.clone(),
            provider_key: config.provider_key.to_option(),
        };
        let integrations = try_outcome!(OrganizationIntegration::list_all(&self.client, &query)
            .await
            .map_err(|err| client_error("read organization integrations", err)));
        let integration = try_outcome!(select_integration(&integrations, &name));
        config.fill(&organization, integration);
        Outcome::set(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn integrations() -> Vec<OrganizationIntegration> {
        serde_json::from_value(json!([
            {"id": "1", "name": "acme", "provider": {"key": "slack"}},
            {"id": "2", "name": "ops", "provider": {"key": "slack"}},
            {"id": "3", "name": "ops", "provider": {"key": "slack"}}
        ]))
        .unwrap()
    }

    #[test]
    fn test_select_integration() {
        let integrations = integrations();
        assert_eq!(select_integration(&integrations, "acme").unwrap().id, "1");

        let diagnostic = select_integration(&integrations, "ops").unwrap_err();
        assert_eq!(diagnostic.summary, "Not unique");

        let diagnostic = select_integration(&integrations, "missing").unwrap_err();
        assert_eq!(diagnostic.summary, "Not found");
    }
}
