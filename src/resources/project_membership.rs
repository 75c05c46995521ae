use async_trait::async_trait;

use super::{api_error, found, gone, known_str, Outcome, Resource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::diagnostics::{import_error, not_supported};
use crate::id::{build_id, split_three_part_id};
use crate::models::{add_project_team, remove_project_team, Project, ProjectScope};
use crate::schema::{Attribute, Schema};
use crate::traits::Get;

/// State of `sentry_project_membership`: one team's access to one project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectMembershipModel {
    pub id: Value<String>,
    pub organization: Value<String>,
    pub project: Value<String>,
    pub team: Value<String>,
}

impl ProjectMembershipModel {
    fn fill(&mut self, organization: &str, project: &str, team: &str) {
        self.id = Value::known(build_id(&[organization, project, team]));
        self.organization = Value::known(organization);
        self.project = Value::known(project);
        self.team = Value::known(team);
    }

    fn parts(&self) -> Result<(String, String, String), crate::diagnostics::Diagnostic> {
        Ok((
            known_str(&self.organization, "organization")?.to_string(),
            known_str(&self.project, "project")?.to_string(),
            known_str(&self.team, "team")?.to_string(),
        ))
    }
}

pub struct ProjectMembershipResource {
    client: SentryClient,
}

impl ProjectMembershipResource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for ProjectMembershipResource {
    type Model = ProjectMembershipModel;

    const TYPE_NAME: &'static str = "project_membership";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::id())
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "project",
                Attribute::required_string()
                    .with_requires_replace()
                    .with_description("The slug of the project."),
            )
            .with_attribute(
                "team",
                Attribute::required_string()
                    .with_requires_replace()
                    .with_description("The slug of the team."),
            )
    }

    async fn create(&self, mut plan: ProjectMembershipModel) -> Outcome<ProjectMembershipModel> {
        let (organization, project, team) = try_outcome!(plan.parts());
        let scope = ProjectScope::new(&organization, &project);
        try_outcome!(add_project_team(&self.client, &scope, &team)
            .await
            .map_err(api_error("add team to project")));
        plan.fill(&organization, &project, &team);
        Outcome::set(plan)
    }

    async fn read(&self, mut state: ProjectMembershipModel) -> Outcome<ProjectMembershipModel> {
        let (organization, project, team) = try_outcome!(state.parts());
        let scope = ProjectScope::new(&organization, &project);
        let Some(entity) = try_outcome!(found(Project::get(&self.client, scope).await, "read")) else {
            return Outcome::remove();
        };
        if !entity.teams.iter().any(|t| t.slug == team) {
            tracing::debug!(project = %project, team = %team, "team no longer has access");
            return Outcome::remove();
        }
        state.fill(&organization, &project, &team);
        Outcome::set(state)
    }

    async fn update(
        &self,
        _plan: ProjectMembershipModel,
        _state: ProjectMembershipModel,
    ) -> Outcome<ProjectMembershipModel> {
        Outcome::failed(not_supported("update"))
    }

    async fn delete(&self, state: ProjectMembershipModel) -> Outcome<ProjectMembershipModel> {
        let (organization, project, team) = try_outcome!(state.parts());
        let scope = ProjectScope::new(organization, project);
        try_outcome!(gone(remove_project_team(&self.client, &scope, &team).await, "delete"));
        Outcome::remove()
    }

    async fn import_state(&self, id: &str) -> Outcome<ProjectMembershipModel> {
        let (organization, project, team) = try_outcome!(split_three_part_id(
            id,
            "organization",
            "project-slug",
            "team-slug"
        )
        .map_err(import_error));
        Outcome::set(ProjectMembershipModel {
            id: Value::known(id),
            organization: Value::Known(organization),
            project: Value::Known(project),
            team: Value::Known(team),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_builds_id() {
        let mut model = ProjectMembershipModel::default();
        model.fill("acme", "web", "frontend");
        assert_eq!(model.id, Value::from("acme/web/frontend"));
    }

    #[test]
    fn test_unknown_part_is_reported() {
        let model = ProjectMembershipModel {
            organization: Value::from("acme"),
            project: Value::Unknown,
            team: Value::from("frontend"),
            ..Default::default()
        };
        let d = model.parts().unwrap_err();
        assert_eq!(d.attribute.as_deref(), Some("project"));
    }

    #[tokio::test]
    async fn test_import_rejects_two_parts() {
        let resource = ProjectMembershipResource::new(SentryClient::new("token", "http://localhost").unwrap());
        let outcome = resource.import_state("acme/web").await;
        assert!(outcome.has_error());
        assert!(outcome
            .diagnostics
            .iter()
            .next()
            .unwrap()
            .detail
            .as_deref()
            .unwrap()
            .contains("expected organization/project-slug/team-slug"));
    }
}
