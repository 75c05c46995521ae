use async_trait::async_trait;

use super::integration_rows::IntegrationTable;
use super::{checked, known_str, Outcome, Resource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::codec::integration_table::{ServiceTableRow, NEW_ROW_ID};
use crate::diagnostics::{client_error, import_error, Diagnostic, Diagnostics};
use crate::id::split_three_part_id;
use crate::schema::{Attribute, Schema};
use crate::validation;

/// State of `sentry_integration_pagerduty`: one row of the integration's
/// service table. The id is the row id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrationPagerDutyModel {
    pub id: Value<String>,
    pub organization: Value<String>,
    pub integration_id: Value<String>,
    pub service: Value<String>,
    pub integration_key: Value<String>,
}

impl IntegrationPagerDutyModel {
    fn fill(&mut self, row: &ServiceTableRow) {
        self.id = Value::known(row.id.as_str());
        self.service = Value::known(row.service.as_str());
        self.integration_key = Value::known(row.integration_key.as_str());
    }

    fn to_row(&self) -> Result<ServiceTableRow, Diagnostic> {
        Ok(ServiceTableRow {
            id: NEW_ROW_ID.to_string(),
            service: known_str(&self.service, "service")?.to_string(),
            integration_key: known_str(&self.integration_key, "integration_key")?.to_string(),
        })
    }

    fn table<'a>(&'a self, client: &'a SentryClient) -> Result<IntegrationTable<'a>, Diagnostic> {
        Ok(IntegrationTable {
            client,
            organization: known_str(&self.organization, "organization")?,
            integration_id: known_str(&self.integration_id, "integration_id")?,
        })
    }
}

pub struct IntegrationPagerDutyResource {
    client: SentryClient,
}

impl IntegrationPagerDutyResource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for IntegrationPagerDutyResource {
    type Model = IntegrationPagerDutyModel;

    const TYPE_NAME: &'static str = "integration_pagerduty";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::id())
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "integration_id",
                Attribute::required_string()
                    .with_requires_replace()
                    .with_description(
                        "The ID of the PagerDuty integration. Use the `sentry_organization_integration` data source to look it up.",
                    ),
            )
            .with_attribute(
                "service",
                Attribute::required_string().with_description("The name of the PagerDuty service."),
            )
            .with_attribute(
                "integration_key",
                Attribute::required_string().with_description("The integration key of the PagerDuty service."),
            )
    }

    fn validate(model: &IntegrationPagerDutyModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validation::not_empty(&mut diags, "service", &model.service);
        validation::not_empty(&mut diags, "integration_key", &model.integration_key);
        diags
    }

    async fn create(&self, mut plan: IntegrationPagerDutyModel) -> Outcome<IntegrationPagerDutyModel> {
        try_outcome!(checked::<Self>(&plan));
        let row = try_outcome!(plan.to_row());
        let table = try_outcome!(plan.table(&self.client));
        let created = try_outcome!(table.insert(&row).await);
        plan.fill(&created);
        Outcome::set(plan)
    }

    async fn read(&self, mut state: IntegrationPagerDutyModel) -> Outcome<IntegrationPagerDutyModel> {
        let id = try_outcome!(known_str(&state.id, "id"));
        let table = try_outcome!(state.table(&self.client));
        let Some(row) = try_outcome!(table.get::<ServiceTableRow>(id).await) else {
            return Outcome::remove();
        };
        state.fill(&row);
        Outcome::set(state)
    }

    async fn update(
        &self,
        mut plan: IntegrationPagerDutyModel,
        state: IntegrationPagerDutyModel,
    ) -> Outcome<IntegrationPagerDutyModel> {
        try_outcome!(checked::<Self>(&plan));
        let id = try_outcome!(known_str(&state.id, "id")).to_string();
        let fields = try_outcome!(plan.to_row());
        let table = try_outcome!(plan.table(&self.client));
        let Some(row) = try_outcome!(table.replace(&id, &fields).await) else {
            return Outcome::remove()
                .with_diagnostic(client_error("update", format!("service table item not found: {id}")));
        };
        plan.fill(&row);
        Outcome::set(plan)
    }

    async fn delete(&self, state: IntegrationPagerDutyModel) -> Outcome<IntegrationPagerDutyModel> {
        let id = try_outcome!(known_str(&state.id, "id"));
        let table = try_outcome!(state.table(&self.client));
        try_outcome!(table.remove::<ServiceTableRow>(id).await);
        Outcome::remove()
    }

    async fn import_state(&self, id: &str) -> Outcome<IntegrationPagerDutyModel> {
        let (organization, integration_id, row_id) =
            try_outcome!(split_three_part_id(id, "organization", "integration-id", "id").map_err(import_error));
        Outcome::set(IntegrationPagerDutyModel {
            id: Value::Known(row_id),
            organization: Value::Known(organization),
            integration_id: Value::Known(integration_id),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_row_uses_placeholder_id() {
        let model = IntegrationPagerDutyModel {
            service: Value::from("S"),
            integration_key: Value::from("K"),
            ..Default::default()
        };
        let row = model.to_row().unwrap();
        assert_eq!(row.id, "0");
        assert_eq!(row.service, "S");
        assert_eq!(row.integration_key, "K");
    }

    #[test]
    fn test_to_row_requires_known_fields() {
        let model = IntegrationPagerDutyModel {
            service: Value::Unknown,
            integration_key: Value::from("K"),
            ..Default::default()
        };
        let diagnostic = model.to_row().unwrap_err();
        assert_eq!(diagnostic.attribute.as_deref(), Some("service"));
    }

    #[tokio::test]
    async fn test_import_state() {
        let client = SentryClient::new("token", "http://localhost:1/").unwrap();
        let resource = IntegrationPagerDutyResource::new(client);
        let model = resource.import_state("acme/123/42").await.into_model().unwrap();
        assert_eq!(model.integration_id, Value::from("123"));
        assert_eq!(model.id, Value::from("42"));
        assert!(resource.import_state("acme/123").await.has_error());
    }
}
