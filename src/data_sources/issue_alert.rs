use async_trait::async_trait;

use super::{lookup, DataSource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::diagnostics::fill_error;
use crate::models::{ProjectRule, ProjectRuleId, ProjectScope};
use crate::resources::{known_str, try_outcome, IssueAlertModel, Outcome};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::traits::Get;

/// `sentry_issue_alert`: one rule by id. Elements come back as raw JSON.
pub struct IssueAlertDataSource {
    client: SentryClient,
}

impl IssueAlertDataSource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for IssueAlertDataSource {
    type Model = IssueAlertModel;

    const TYPE_NAME: &'static str = "issue_alert";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("organization", Attribute::organization())
            .with_attribute("project", Attribute::required_string().with_description("The project of this resource."))
            .with_attribute("id", Attribute::required_string().with_description("The ID of this resource."))
            .with_attribute("name", Attribute::computed_string().with_description("The issue alert name."))
            .with_attribute("conditions", Attribute::computed(AttributeType::Json).with_description("List of conditions."))
            .with_attribute("filters", Attribute::computed(AttributeType::Json).with_description("List of filters."))
            .with_attribute("actions", Attribute::computed(AttributeType::Json).with_description("List of actions."))
            .with_attribute(
                "action_match",
                Attribute::computed_string().with_description("Trigger actions when an event is captured by Sentry and `any` or `all` of the specified conditions happen."),
            )
            .with_attribute(
                "filter_match",
                Attribute::computed_string().with_description("A string determining which filters need to be true before any actions take place."),
            )
            .with_attribute(
                "frequency",
                Attribute::computed(AttributeType::Int64).with_description("Perform actions at most once every `X` minutes for this issue."),
            )
            .with_attribute("environment", Attribute::computed_string().with_description("Perform issue alert in a specific environment."))
            .with_attribute("owner", Attribute::computed_string().with_description("The ID of the team or user that owns the rule."))
    }

    async fn read(&self, mut config: IssueAlertModel) -> Outcome<IssueAlertModel> {
        let organization = try_outcome!(known_str(&config.organization, "organization")).to_string();
        let id = ProjectRuleId {
            scope: ProjectScope::new(
                organization.as_str(),
                try_outcome!(known_str(&config.project, "project")),
            ),
            rule_id: try_outcome!(known_str(&config.id, "id")).to_string(),
        };
        let rule = try_outcome!(lookup(ProjectRule::get(&self.client, id).await, "issue alert"));
        // Only the raw representation exists here.
        config.conditions_v2 = Value::Null;
        config.filters_v2 = Value::Null;
        config.actions_v2 = Value::Null;
        try_outcome!(config.fill(&organization, &rule).map_err(fill_error));
        Outcome::set(config)
    }
}
