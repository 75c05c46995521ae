use std::collections::HashMap;

use async_trait::async_trait;

use super::{api_error, checked, found, gone, known_str, Outcome, Resource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::diagnostics::{client_error, import_error, not_found, Diagnostic, Diagnostics};
use crate::id::split_two_part_id;
use crate::models::{
    create_notification_action, delete_notification_action, update_notification_action, NotificationAction,
    NotificationActionRequest, Project, ProjectListQuery,
};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::traits::{Get, List};
use crate::validation;

pub const NOTIFICATION_SERVICE_TYPES: &[&str] = &["email", "slack", "sentry_notification", "pagerduty", "opsgenie"];

pub const NOTIFICATION_TRIGGER_TYPES: &[&str] = &["spike-protection"];

/// State of `sentry_notification_action`. Projects are slugs here and
/// numeric ids on the Service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationActionModel {
    pub id: Value<String>,
    pub organization: Value<String>,
    pub trigger_type: Value<String>,
    pub service_type: Value<String>,
    pub integration_id: Value<String>,
    pub target_identifier: Value<String>,
    pub target_display: Value<String>,
    pub projects: Value<Vec<String>>,
}

impl NotificationActionModel {
    /// Copy `action` into the model. `slugs` maps project ids to slugs; an
    /// id missing from it is kept as is. An action without projects leaves
    /// the planned projects alone.
    fn fill(&mut self, action: &NotificationAction, slugs: &HashMap<String, String>) {
        self.id = Value::known(action.id.as_str());
        self.trigger_type = Value::known(action.trigger_type.as_str());
        self.service_type = Value::known(action.service_type.as_str());
        self.integration_id = Value::from_option(action.integration_id.clone());
        self.target_identifier = Value::from_option(action.target_identifier());
        self.target_display = Value::from_option(action.target_display.clone());

        let ids = action.project_ids();
        if !ids.is_empty() {
            self.projects = Value::Known(
                ids.into_iter()
                    .map(|id| slugs.get(&id).cloned().unwrap_or(id))
                    .collect(),
            );
        }
    }

    fn to_request(&self) -> Result<NotificationActionRequest, Diagnostic> {
        Ok(NotificationActionRequest {
            trigger_type: known_str(&self.trigger_type, "trigger_type")?.to_string(),
            service_type: known_str(&self.service_type, "service_type")?.to_string(),
            integration_id: self.integration_id.to_option(),
            target_identifier: self.target_identifier.to_option(),
            target_display: self.target_display.to_option(),
            projects: self.projects.to_option().unwrap_or_default(),
        })
    }
}

pub struct NotificationActionResource {
    client: SentryClient,
}

impl NotificationActionResource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }

    /// Project id to slug for every project of the organization.
    async fn project_slugs(&self, organization: &str) -> Result<HashMap<String, String>, Diagnostic> {
        let projects = Project::list_all(&self.client, &ProjectListQuery::organization(organization))
            .await
            .map_err(|err| client_error("read projects", err))?;
        Ok(projects.into_iter().map(|p| (p.id, p.slug)).collect())
    }

    async fn fill(
        &self,
        model: &mut NotificationActionModel,
        organization: &str,
        action: &NotificationAction,
    ) -> Result<(), Diagnostic> {
        let slugs = if action.projects.is_empty() {
            HashMap::new()
        } else {
            self.project_slugs(organization).await?
        };
        model.fill(action, &slugs);
        Ok(())
    }
}

#[async_trait]
impl Resource for NotificationActionResource {
    type Model = NotificationActionModel;

    const TYPE_NAME: &'static str = "notification_action";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::id())
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "trigger_type",
                Attribute::required_string()
                    .with_description("The type of trigger that will activate this action. Valid values are `spike-protection`."),
            )
            .with_attribute(
                "service_type",
                Attribute::required_string().with_description("The service that is used for sending the notification."),
            )
            .with_attribute(
                "integration_id",
                Attribute::optional_string().with_description(
                    "The ID of the integration that is used for sending the notification. Required if `service_type` is `slack`, `pagerduty` or `opsgenie`.",
                ),
            )
            .with_attribute(
                "target_identifier",
                Attribute::optional_string().with_description(
                    "The identifier of the target that is used for sending the notification (e.g. Slack channel ID).",
                ),
            )
            .with_attribute(
                "target_display",
                Attribute::optional_string().with_description(
                    "The display name of the target that is used for sending the notification (e.g. Slack channel name).",
                ),
            )
            .with_attribute(
                "projects",
                Attribute::required(AttributeType::list(AttributeType::String))
                    .with_description("The list of project slugs that the Notification Action is created for."),
            )
    }

    fn validate(model: &NotificationActionModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validation::one_of(&mut diags, "trigger_type", &model.trigger_type, NOTIFICATION_TRIGGER_TYPES);
        validation::one_of(&mut diags, "service_type", &model.service_type, NOTIFICATION_SERVICE_TYPES);
        diags
    }

    async fn create(&self, mut plan: NotificationActionModel) -> Outcome<NotificationActionModel> {
        try_outcome!(checked::<Self>(&plan));
        let organization = try_outcome!(known_str(&plan.organization, "organization")).to_string();
        let request = try_outcome!(plan.to_request());
        let action = try_outcome!(create_notification_action(&self.client, &organization, &request)
            .await
            .map_err(api_error("create")));
        tracing::info!(organization = %organization, action = %action.id, "created notification action");
        try_outcome!(self.fill(&mut plan, &organization, &action).await);
        Outcome::set(plan)
    }

    async fn read(&self, mut state: NotificationActionModel) -> Outcome<NotificationActionModel> {
        let organization = try_outcome!(known_str(&state.organization, "organization")).to_string();
        let id = try_outcome!(known_str(&state.id, "id")).to_string();
        let Some(action) = try_outcome!(found(
            NotificationAction::get(&self.client, (organization.clone(), id)).await,
            "read"
        )) else {
            return Outcome::remove();
        };
        try_outcome!(self.fill(&mut state, &organization, &action).await);
        Outcome::set(state)
    }

    async fn update(
        &self,
        mut plan: NotificationActionModel,
        state: NotificationActionModel,
    ) -> Outcome<NotificationActionModel> {
        try_outcome!(checked::<Self>(&plan));
        let organization = try_outcome!(known_str(&state.organization, "organization")).to_string();
        let id = try_outcome!(known_str(&state.id, "id"));
        let request = try_outcome!(plan.to_request());
        let Some(action) = try_outcome!(found(
            update_notification_action(&self.client, &organization, id, &request).await,
            "update"
        )) else {
            return Outcome::remove().with_diagnostic(not_found("notification action"));
        };
        try_outcome!(self.fill(&mut plan, &organization, &action).await);
        Outcome::set(plan)
    }

    async fn delete(&self, state: NotificationActionModel) -> Outcome<NotificationActionModel> {
        let organization = try_outcome!(known_str(&state.organization, "organization"));
        let id = try_outcome!(known_str(&state.id, "id"));
        try_outcome!(gone(
            delete_notification_action(&self.client, organization, id).await,
            "delete"
        ));
        Outcome::remove()
    }

    async fn import_state(&self, id: &str) -> Outcome<NotificationActionModel> {
        let (organization, action_id) =
            try_outcome!(split_two_part_id(id, "organization", "action-id").map_err(import_error));
        Outcome::set(NotificationActionModel {
            id: Value::Known(action_id),
            organization: Value::Known(organization),
            ..Default::default()
        })
    }
}
