use async_trait::async_trait;

use super::{api_error, gone, known_str, Outcome, Resource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::diagnostics::{client_error, import_error, not_found, not_supported, Diagnostic};
use crate::error::Result;
use crate::id::{build_id, split_three_part_id};
use crate::models::{
    add_team_member, effective_team_role, remove_team_member, set_team_member_role, Organization,
    OrganizationMember, Team,
};
use crate::schema::{Attribute, Schema};
use crate::traits::Get;

/// State of `sentry_team_member`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamMemberModel {
    pub id: Value<String>,
    pub organization: Value<String>,
    pub team: Value<String>,
    pub member_id: Value<String>,
    pub role: Value<String>,
    pub effective_role: Value<String>,
}

impl TeamMemberModel {
    fn fill(&mut self, organization: &str, team: &str, member_id: &str, effective_role: Option<String>) {
        self.id = Value::known(build_id(&[organization, team, member_id]));
        self.organization = Value::known(organization);
        self.team = Value::known(team);
        self.member_id = Value::known(member_id);
        self.effective_role = Value::from_option(effective_role);
    }
}

pub struct TeamMemberResource {
    client: SentryClient,
}

impl TeamMemberResource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }

    /// Read what the member effectively holds in the team. `Ok(None)` when
    /// the organization, team or member is gone.
    async fn effective_role(
        &self,
        organization: &str,
        team: &str,
        member_id: &str,
    ) -> Result<Option<Option<String>>> {
        let org = Organization::get(&self.client, organization.to_string());
        let team_entity = Team::get(&self.client, (organization.to_string(), team.to_string()));
        let member = OrganizationMember::get(
            &self.client,
            (organization.to_string(), member_id.to_string()),
        );
        let (org, team_entity, member) = match (org.await, team_entity.await, member.await) {
            (Ok(org), Ok(team_entity), Ok(member)) => (org, team_entity, member),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) if e.is_not_found() => return Ok(None),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => return Err(e),
        };
        Ok(Some(effective_team_role(&org, &team_entity, &member, team)))
    }

    async fn set_role(&self, organization: &str, member_id: &str, team: &str, role: &str) -> std::result::Result<(), Diagnostic> {
        let membership = set_team_member_role(&self.client, organization, member_id, team, role)
            .await
            .map_err(api_error("create"))?;
        if membership.is_active == Some(false) {
            return Err(client_error("create", "team member is not active"));
        }
        Ok(())
    }
}

#[async_trait]
impl Resource for TeamMemberResource {
    type Model = TeamMemberModel;

    const TYPE_NAME: &'static str = "team_member";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::id())
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "team",
                Attribute::required_string()
                    .with_requires_replace()
                    .with_description("The slug of the team to add the member to."),
            )
            .with_attribute(
                "member_id",
                Attribute::required_string()
                    .with_requires_replace()
                    .with_description("The ID of the organization member to add to the team."),
            )
            .with_attribute(
                "role",
                Attribute::optional_string()
                    .with_requires_replace()
                    .with_description("The team-level role to switch to."),
            )
            .with_attribute(
                "effective_role",
                Attribute::computed_string()
                    .with_description("The effective team-level role, taking organization roles into account."),
            )
    }

    async fn create(&self, mut plan: TeamMemberModel) -> Outcome<TeamMemberModel> {
        let organization = try_outcome!(known_str(&plan.organization, "organization")).to_string();
        let team = try_outcome!(known_str(&plan.team, "team")).to_string();
        let member_id = try_outcome!(known_str(&plan.member_id, "member_id")).to_string();

        try_outcome!(add_team_member(&self.client, &organization, &member_id, &team)
            .await
            .map_err(api_error("create")));

        if let Some(role) = plan.role.as_deref() {
            try_outcome!(self.set_role(&organization, &member_id, &team, role).await);
        }

        let effective = match self.effective_role(&organization, &team, &member_id).await {
            Ok(Some(effective)) => effective,
            Ok(None) => return Outcome::remove().with_diagnostic(not_found("team member")),
            Err(err) => return Outcome::remove().with_diagnostic(client_error("create", err)),
        };
        plan.fill(&organization, &team, &member_id, effective);
        Outcome::set(plan)
    }

    async fn read(&self, mut state: TeamMemberModel) -> Outcome<TeamMemberModel> {
        let organization = try_outcome!(known_str(&state.organization, "organization")).to_string();
        let team = try_outcome!(known_str(&state.team, "team")).to_string();
        let member_id = try_outcome!(known_str(&state.member_id, "member_id")).to_string();

        let effective = match self.effective_role(&organization, &team, &member_id).await {
            Ok(Some(effective)) => effective,
            Ok(None) => return Outcome::remove(),
            Err(err) => return Outcome::failed(client_error("read", err)),
        };
        state.fill(&organization, &team, &member_id, effective);
        Outcome::set(state)
    }

    async fn update(&self, _plan: TeamMemberModel, _state: TeamMemberModel) -> Outcome<TeamMemberModel> {
        Outcome::failed(not_supported("update"))
    }

    async fn delete(&self, state: TeamMemberModel) -> Outcome<TeamMemberModel> {
        let organization = try_outcome!(known_str(&state.organization, "organization"));
        let team = try_outcome!(known_str(&state.team, "team"));
        let member_id = try_outcome!(known_str(&state.member_id, "member_id"));
        try_outcome!(gone(
            remove_team_member(&self.client, organization, member_id, team).await,
            "delete"
        ));
        Outcome::remove()
    }

    async fn import_state(&self, id: &str) -> Outcome<TeamMemberModel> {
        let (organization, team, member_id) = try_outcome!(split_three_part_id(
            id,
            "organization",
            "team-slug",
            "member-id"
        )
        .map_err(import_error));
        Outcome::set(TeamMemberModel {
            id: Value::known(id),
            organization: Value::Known(organization),
            team: Value::Known(team),
            member_id: Value::Known(member_id),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_is_not_supported() {
        let resource = TeamMemberResource::new(SentryClient::new("token", "http://localhost").unwrap());
        let outcome = resource
            .update(TeamMemberModel::default(), TeamMemberModel::default())
            .await;
        assert_eq!(outcome.state, crate::resources::StateChange::Keep);
        let d = outcome.diagnostics.iter().next().unwrap();
        assert_eq!(d.summary, "Not supported");
    }

    #[tokio::test]
    async fn test_import() {
        let resource = TeamMemberResource::new(SentryClient::new("token", "http://localhost").unwrap());
        let model = resource
            .import_state("acme/backend/42")
            .await
            .into_model()
            .unwrap();
        assert_eq!(model.id, Value::from("acme/backend/42"));
        assert_eq!(model.team, Value::from("backend"));
        assert_eq!(model.member_id, Value::from("42"));
    }
}
