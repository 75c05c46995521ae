use async_trait::async_trait;

use super::{api_error, found, gone, known_str, Outcome, Resource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::diagnostics::{import_error, Diagnostic};
use crate::id::{build_id, split_two_part_id};
use crate::models::{disable_spike_protection, set_spike_protection, Project, ProjectScope, SpikeProtectionRequest};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::traits::Get;

/// State of `sentry_project_spike_protection`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectSpikeProtectionModel {
    pub id: Value<String>,
    pub organization: Value<String>,
    pub project: Value<String>,
    pub enabled: Value<bool>,
}

impl ProjectSpikeProtectionModel {
    fn scope(&self) -> Result<ProjectScope, Diagnostic> {
        Ok(ProjectScope::new(
            known_str(&self.organization, "organization")?,
            known_str(&self.project, "project")?,
        ))
    }

    fn fill(&mut self, organization: &str, project: &Project) {
        self.id = Value::known(build_id(&[organization, &project.slug]));
        self.organization = Value::known(project.organization_slug().unwrap_or(organization));
        self.project = Value::known(project.slug.as_str());
        if let Some(enabled) = project.spike_protection_enabled() {
            self.enabled = Value::Known(enabled);
        }
    }
}

pub struct ProjectSpikeProtectionResource {
    client: SentryClient,
}

impl ProjectSpikeProtectionResource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }

    async fn write(&self, mut plan: ProjectSpikeProtectionModel, action: &'static str) -> Outcome<ProjectSpikeProtectionModel> {
        let scope = try_outcome!(plan.scope());
        let enabled = plan.enabled.as_known().copied().unwrap_or(false);
        let request = SpikeProtectionRequest::new([scope.project.as_str()]);
        try_outcome!(set_spike_protection(&self.client, &scope.organization, &request, enabled)
            .await
            .map_err(api_error(action)));
        plan.id = Value::known(build_id(&[&scope.organization, &scope.project]));
        Outcome::set(plan)
    }
}

#[async_trait]
impl Resource for ProjectSpikeProtectionResource {
    type Model = ProjectSpikeProtectionModel;

    const TYPE_NAME: &'static str = "project_spike_protection";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::id())
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "project",
                Attribute::required_string()
                    .with_requires_replace()
                    .with_description("The slug of the project to enable or disable spike protection for."),
            )
            .with_attribute(
                "enabled",
                Attribute::required(AttributeType::Bool).with_description("Whether spike protection is enabled."),
            )
    }

    async fn create(&self, plan: ProjectSpikeProtectionModel) -> Outcome<ProjectSpikeProtectionModel> {
        self.write(plan, "create").await
    }

    async fn read(&self, mut state: ProjectSpikeProtectionModel) -> Outcome<ProjectSpikeProtectionModel> {
        let scope = try_outcome!(state.scope());
        let organization = scope.organization.clone();
        let Some(project) = try_outcome!(found(Project::get(&self.client, scope).await, "read")) else {
            return Outcome::remove();
        };
        state.fill(&organization, &project);
        Outcome::set(state)
    }

    async fn update(
        &self,
        plan: ProjectSpikeProtectionModel,
        _state: ProjectSpikeProtectionModel,
    ) -> Outcome<ProjectSpikeProtectionModel> {
        self.write(plan, "update").await
    }

    async fn delete(&self, state: ProjectSpikeProtectionModel) -> Outcome<ProjectSpikeProtectionModel> {
        let scope = try_outcome!(state.scope());
        let request = SpikeProtectionRequest::new([scope.project.as_str()]);
        try_outcome!(gone(
            disable_spike_protection(&self.client, &scope.organization, &request).await,
            "delete"
        ));
        Outcome::remove()
    }

    async fn import_state(&self, id: &str) -> Outcome<ProjectSpikeProtectionModel> {
        let (organization, project) =
            try_outcome!(split_two_part_id(id, "organization", "project-slug").map_err(import_error));
        Outcome::set(ProjectSpikeProtectionModel {
            id: Value::known(id),
            organization: Value::Known(organization),
            project: Value::Known(project),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fill_reads_disabled_option() {
        let project: Project = serde_json::from_value(json!({
            "id": "2",
            "slug": "web",
            "name": "Web",
            "options": {"quotas:spike-protection-disabled": true}
        }))
        .unwrap();
        let mut model = ProjectSpikeProtectionModel::default();
        model.fill("acme", &project);
        assert_eq!(model.id, Value::from("acme/web"));
        assert_eq!(model.enabled, Value::Known(false));
    }

    #[test]
    fn test_fill_without_option_keeps_enabled() {
        let project: Project = serde_json::from_value(json!({"id": "2", "slug": "web", "name": "Web"})).unwrap();
        let mut model = ProjectSpikeProtectionModel {
            enabled: Value::Known(true),
            ..Default::default()
        };
        model.fill("acme", &project);
        assert_eq!(model.enabled, Value::Known(true));
    }
}
