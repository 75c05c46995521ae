use std::collections::BTreeSet;

use async_trait::async_trait;

use super::{api_error, checked, known_str, Outcome, Resource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::diagnostics::{not_supported, Diagnostic, Diagnostics};
use crate::models::{set_spike_protection, Project, ProjectListQuery, SpikeProtectionRequest, OPTION_SPIKE_PROTECTION_DISABLED};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::traits::List;
use crate::validation;

/// State of `sentry_all_projects_spike_protection`. There is no id; the
/// resource is the switch applied to `projects`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllProjectsSpikeProtectionModel {
    pub organization: Value<String>,
    pub enabled: Value<bool>,
    pub projects: Value<Vec<String>>,
}

impl AllProjectsSpikeProtectionModel {
    fn target(&self) -> Result<(String, bool, Vec<String>), Diagnostic> {
        Ok((
            known_str(&self.organization, "organization")?.to_string(),
            self.enabled.as_known().copied().unwrap_or(false),
            self.projects.to_option().unwrap_or_default(),
        ))
    }

    /// Keep the wanted projects whose switch is in the `enabled` position.
    /// Listings without the option count as not matching.
    fn fill(&mut self, organization: &str, enabled: bool, wanted: &[String], listed: &[Project]) {
        let wanted: BTreeSet<&str> = wanted.iter().map(String::as_str).collect();
        self.organization = Value::known(organization);
        self.enabled = Value::Known(enabled);
        self.projects = Value::Known(
            listed
                .iter()
                .filter(|project| wanted.contains(project.slug.as_str()))
                .filter(|project| project.spike_protection_enabled() == Some(enabled))
                .map(|project| project.slug.clone())
                .collect(),
        );
    }
}

pub struct AllProjectsSpikeProtectionResource {
    client: SentryClient,
}

impl AllProjectsSpikeProtectionResource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }

    async fn apply(&self, organization: &str, projects: &[String], enabled: bool, action: &'static str) -> Result<(), Diagnostic> {
        let request = SpikeProtectionRequest::new(projects.iter().map(String::as_str));
        tracing::info!(organization = %organization, projects = projects.len(), enabled, "switching spike protection");
        set_spike_protection(&self.client, organization, &request, enabled)
            .await
            .map_err(api_error(action))
    }

    async fn refresh(&self, mut model: AllProjectsSpikeProtectionModel) -> Outcome<AllProjectsSpikeProtectionModel> {
        let (organization, enabled, wanted) = try_outcome!(model.target());
        let query = ProjectListQuery::organization(organization.as_str()).with_option(OPTION_SPIKE_PROTECTION_DISABLED);
        let listed = try_outcome!(Project::list_all(&self.client, &query).await.map_err(api_error("read")));
        model.fill(&organization, enabled, &wanted, &listed);
        Outcome::set(model)
    }

    async fn write(&self, plan: AllProjectsSpikeProtectionModel, action: &'static str) -> Outcome<AllProjectsSpikeProtectionModel> {
        let (organization, enabled, projects) = try_outcome!(plan.target());
        try_outcome!(self.apply(&organization, &projects, enabled, action).await);
        self.refresh(plan).await
    }
}

#[async_trait]
impl Resource for AllProjectsSpikeProtectionResource {
    type Model = AllProjectsSpikeProtectionModel;

    const TYPE_NAME: &'static str = "all_projects_spike_protection";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "projects",
                Attribute::required(AttributeType::set(AttributeType::String))
                    .with_description("The slugs of the projects to enable or disable spike protection for."),
            )
            .with_attribute(
                "enabled",
                Attribute::required(AttributeType::Bool)
                    .with_description("Toggle spike protection on or off for the listed projects."),
            )
    }

    fn validate(model: &AllProjectsSpikeProtectionModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validation::size_at_least(&mut diags, "projects", &model.projects, 1);
        diags
    }

    async fn create(&self, plan: AllProjectsSpikeProtectionModel) -> Outcome<AllProjectsSpikeProtectionModel> {
        try_outcome!(checked::<Self>(&plan));
        self.write(plan, "create").await
    }

    async fn read(&self, state: AllProjectsSpikeProtectionModel) -> Outcome<AllProjectsSpikeProtectionModel> {
        self.refresh(state).await
    }

    async fn update(
        &self,
        plan: AllProjectsSpikeProtectionModel,
        _state: AllProjectsSpikeProtectionModel,
    ) -> Outcome<AllProjectsSpikeProtectionModel> {
        try_outcome!(checked::<Self>(&plan));
        self.write(plan, "update").await
    }

    /// Flip the switch back for every recorded project.
    async fn delete(&self, state: AllProjectsSpikeProtectionModel) -> Outcome<AllProjectsSpikeProtectionModel> {
        let (organization, enabled, projects) = try_outcome!(state.target());
        try_outcome!(self.apply(&organization, &projects, !enabled, "delete").await);
        Outcome::remove()
    }

    async fn import_state(&self, _id: &str) -> Outcome<AllProjectsSpikeProtectionModel> {
        Outcome::failed(not_supported("import"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn project(slug: &str, disabled: Option<bool>) -> Project {
        let options = match disabled {
            Some(d) => json!({"quotas:spike-protection-disabled": d}),
            None => json!({}),
        };
        serde_json::from_value(json!({"id": "1", "slug": slug, "name": slug, "options": options})).unwrap()
    }

    #[test]
    fn test_fill_keeps_matching_projects() {
        let listed = vec![
            project("web", Some(false)),
            project("api", Some(true)),
            project("worker", None),
            project("other", Some(false)),
        ];
        let wanted = vec!["web".to_string(), "api".to_string(), "worker".to_string()];
        let mut model = AllProjectsSpikeProtectionModel::default();
        model.fill("acme", true, &wanted, &listed);
        assert_eq!(model.projects, Value::Known(vec!["web".to_string()]));
        assert_eq!(model.enabled, Value::Known(true));

        model.fill("acme", false, &wanted, &listed);
        assert_eq!(model.projects, Value::Known(vec!["api".to_string()]));
    }

    #[test]
    fn test_validate_requires_a_project() {
        let model = AllProjectsSpikeProtectionModel {
            projects: Value::Known(Vec::new()),
            ..Default::default()
        };
        assert!(AllProjectsSpikeProtectionResource::validate(&model).has_error());
    }

    #[tokio::test]
    async fn test_import_not_supported() {
        let client = SentryClient::new("token", "http://localhost:1/").unwrap();
        let outcome = AllProjectsSpikeProtectionResource::new(client).import_state("acme").await;
        assert!(outcome.has_error());
    }
}
