use async_trait::async_trait;

use super::integration_rows::IntegrationTable;
use super::{checked, known_str, Outcome, Resource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::codec::integration_table::{TeamTableRow, NEW_ROW_ID};
use crate::diagnostics::{client_error, import_error, Diagnostic, Diagnostics};
use crate::id::split_three_part_id;
use crate::schema::{Attribute, Schema};
use crate::validation;

/// State of `sentry_integration_opsgenie`: one row of the integration's
/// team table. The id is the row id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrationOpsgenieModel {
    pub id: Value<String>,
    pub organization: Value<String>,
    pub integration_id: Value<String>,
    pub team: Value<String>,
    pub integration_key: Value<String>,
}

impl IntegrationOpsgenieModel {
    fn fill(&mut self, row: &TeamTableRow) {
        self.id = Value::known(row.id.as_str());
        self.team = Value::known(row.team.as_str());
        self.integration_key = Value::known(row.integration_key.as_str());
    }

    fn to_row(&self) -> Result<TeamTableRow, Diagnostic> {
        Ok(TeamTableRow {
            id: NEW_ROW_ID.to_string(),
            team: known_str(&self.team, "team")?.to_string(),
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

pub struct IntegrationOpsgenieResource {
    client: SentryClient,
}

impl IntegrationOpsgenieResource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for IntegrationOpsgenieResource {
    type Model = IntegrationOpsgenieModel;

    const TYPE_NAME: &'static str = "integration_opsgenie";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::id())
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "integration_id",
                Attribute::required_string()
                    .with_requires_replace()
                    .with_description(
                        "The ID of the Opsgenie integration. Use the `sentry_organization_integration` data source to look it up.",
                    ),
            )
            .with_attribute(
                "team",
                Attribute::required_string()
                    .with_description("The name of the Opsgenie team. In Sentry, this is called Label."),
            )
            .with_attribute(
                "integration_key",
                Attribute::required_string().with_description("The integration key of the Opsgenie service."),
            )
    }

    fn validate(model: &IntegrationOpsgenieModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validation::not_empty(&mut diags, "team", &model.team);
        validation::not_empty(&mut diags, "integration_key", &model.integration_key);
        diags
    }

    async fn create(&self, mut plan: IntegrationOpsgenieModel) -> Outcome<IntegrationOpsgenieModel> {
        try_outcome!(checked::<Self>(&plan));
        let row = try_outcome!(plan.to_row());
        let table = try_outcome!(plan.table(&self.client));
        let created = try_outcome!(table.insert(&row).await);
        plan.fill(&created);
        Outcome::set(plan)
    }

    async fn read(&self, mut state: IntegrationOpsgenieModel) -> Outcome<IntegrationOpsgenieModel> {
        let id = try_outcome!(known_str(&state.id, "id"));
        let table = try_outcome!(state.table(&self.client));
        let Some(row) = try_outcome!(table.get::<TeamTableRow>(id).await) else {
            return Outcome::remove();
        };
        state.fill(&row);
        Outcome::set(state)
    }

    async fn update(
        &self,
        mut plan: IntegrationOpsgenieModel,
        state: IntegrationOpsgenieModel,
    ) -> Outcome<IntegrationOpsgenieModel> {
        try_outcome!(checked::<Self>(&plan));
        let id = try_outcome!(known_str(&state.id, "id")).to_string();
        let fields = try_outcome!(plan.to_row());
        let table = try_outcome!(plan.table(&self.client));
        let Some(row) = try_outcome!(table.replace(&id, &fields).await) else {
            return Outcome::remove()
                .with_diagnostic(client_error("update", format!("team table item not found: {id}")));
        };
        plan.fill(&row);
        Outcome::set(plan)
    }

    async fn delete(&self, state: IntegrationOpsgenieModel) -> Outcome<IntegrationOpsgenieModel> {
        let id = try_outcome!(known_str(&state.id, "id"));
        let table = try_outcome!(state.table(&self.client));
        try_outcome!(table.remove::<TeamTableRow>(id).await);
        Outcome::remove()
    }

    async fn import_state(&self, id: &str) -> Outcome<IntegrationOpsgenieModel> {
        let (organization, integration_id, row_id) =
            try_outcome!(split_three_part_id(id, "organization", "integration-id", "id").map_err(import_error));
        Outcome::set(IntegrationOpsgenieModel {
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
    fn test_fill_from_row() {
        let row = TeamTableRow {
            id: "3".to_string(),
            team: "backend".to_string(),
            integration_key: "k-123".to_string(),
        };
        let mut model = IntegrationOpsgenieModel {
            organization: Value::from("acme"),
            integration_id: Value::from("55"),
            ..Default::default()
        };
        model.fill(&row);
        assert_eq!(model.id, Value::from("3"));
        assert_eq!(model.team, Value::from("backend"));
        assert_eq!(model.integration_id, Value::from("55"));
    }

    #[test]
    fn test_validate_empty_team() {
        let model = IntegrationOpsgenieModel {
            team: Value::from(""),
            integration_key: Value::Unknown,
            ..Default::default()
        };
        let diags = IntegrationOpsgenieResource::validate(&model);
        assert_eq!(diags.len(), 1);
    }
}
