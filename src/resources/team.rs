use async_trait::async_trait;

use super::{api_error, checked, found, gone, known_str, Outcome, Resource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::diagnostics::{import_error, Diagnostics};
use crate::id::split_two_part_id;
use crate::models::{create_team, delete_team, update_team, Team, TeamRequest};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::traits::Get;
use crate::validation;

/// State of `sentry_team`. The resource id is the team slug.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamModel {
    pub id: Value<String>,
    pub organization: Value<String>,
    pub name: Value<String>,
    pub slug: Value<String>,
    pub internal_id: Value<String>,
    pub has_access: Value<bool>,
    pub is_pending: Value<bool>,
    pub is_member: Value<bool>,
}

impl TeamModel {
    pub fn fill(&mut self, organization: &str, team: &Team) {
        self.id = Value::known(team.slug.as_str());
        self.organization = Value::known(organization);
        self.name = Value::known(team.name.as_str());
        self.slug = Value::known(team.slug.as_str());
        self.internal_id = Value::known(team.id.as_str());
        self.has_access = Value::Known(team.has_access);
        self.is_pending = Value::Known(team.is_pending);
        self.is_member = Value::Known(team.is_member);
    }

    fn to_request(&self) -> TeamRequest {
        TeamRequest {
            name: self.name.to_option(),
            slug: self.slug.to_option(),
        }
    }
}

pub struct TeamResource {
    client: SentryClient,
}

impl TeamResource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for TeamResource {
    type Model = TeamModel;

    const TYPE_NAME: &'static str = "team";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::id())
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "name",
                Attribute::required_string().with_description("The name of the team."),
            )
            .with_attribute(
                "slug",
                Attribute::optional_computed(AttributeType::String)
                    .with_state_for_unknown()
                    .with_description("The unique URL slug for this team. Derived from the name when omitted."),
            )
            .with_attribute("internal_id", Attribute::computed_string().with_state_for_unknown())
            .with_attribute("has_access", Attribute::computed(AttributeType::Bool))
            .with_attribute("is_pending", Attribute::computed(AttributeType::Bool))
            .with_attribute("is_member", Attribute::computed(AttributeType::Bool))
    }

    fn validate(model: &TeamModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validation::not_empty(&mut diags, "name", &model.name);
        validation::not_empty(&mut diags, "slug", &model.slug);
        diags
    }

    async fn create(&self, mut plan: TeamModel) -> Outcome<TeamModel> {
        try_outcome!(checked::<Self>(&plan));
        let organization = try_outcome!(known_str(&plan.organization, "organization")).to_string();
        let team = try_outcome!(create_team(&self.client, &organization, &plan.to_request())
            .await
            .map_err(api_error("create")));
        tracing::info!(organization = %organization, slug = %team.slug, "created team");
        plan.fill(&organization, &team);
        Outcome::set(plan)
    }

    async fn read(&self, mut state: TeamModel) -> Outcome<TeamModel> {
        let organization = try_outcome!(known_str(&state.organization, "organization")).to_string();
        let slug = try_outcome!(known_str(&state.id, "id")).to_string();
        let Some(team) = try_outcome!(found(
            Team::get(&self.client, (organization.clone(), slug)).await,
            "read"
        )) else {
            return Outcome::remove();
        };
        state.fill(&organization, &team);
        Outcome::set(state)
    }

    async fn update(&self, mut plan: TeamModel, state: TeamModel) -> Outcome<TeamModel> {
        try_outcome!(checked::<Self>(&plan));
        let organization = try_outcome!(known_str(&plan.organization, "organization")).to_string();
        let slug = try_outcome!(known_str(&state.id, "id")).to_string();
        let team = try_outcome!(update_team(&self.client, &organization, &slug, &plan.to_request())
            .await
            .map_err(api_error("update")));
        plan.fill(&organization, &team);
        Outcome::set(plan)
    }

    async fn delete(&self, state: TeamModel) -> Outcome<TeamModel> {
        let organization = try_outcome!(known_str(&state.organization, "organization"));
        let slug = try_outcome!(known_str(&state.id, "id"));
        try_outcome!(gone(delete_team(&self.client, organization, slug).await, "delete"));
        Outcome::remove()
    }

    async fn import_state(&self, id: &str) -> Outcome<TeamModel> {
        let (organization, slug) =
            try_outcome!(split_two_part_id(id, "organization", "team-slug").map_err(import_error));
        Outcome::set(TeamModel {
            id: Value::Known(slug),
            organization: Value::Known(organization),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fill() {
        let team: Team = serde_json::from_value(json!({
            "id": "4502938751",
            "slug": "backend",
            "name": "Backend",
            "hasAccess": true,
            "isPending": false,
            "isMember": true
        }))
        .unwrap();
        let mut model = TeamModel::default();
        model.fill("acme", &team);
        assert_eq!(model.id, Value::from("backend"));
        assert_eq!(model.internal_id, Value::from("4502938751"));
        assert_eq!(model.is_member, Value::Known(true));
    }

    #[test]
    fn test_unknown_slug_is_not_sent() {
        let model = TeamModel {
            name: Value::from("Backend"),
            slug: Value::Unknown,
            ..Default::default()
        };
        let body = serde_json::to_value(model.to_request()).unwrap();
        assert_eq!(body, json!({"name": "Backend"}));
    }

    #[tokio::test]
    async fn test_import() {
        let resource = TeamResource::new(SentryClient::new("token", "http://localhost").unwrap());
        let outcome = resource.import_state("acme/backend").await;
        let model = outcome.into_model().unwrap();
        assert_eq!(model.organization, Value::from("acme"));
        assert_eq!(model.id, Value::from("backend"));

        let outcome = resource.import_state("acme").await;
        assert!(outcome.has_error());
        assert_eq!(outcome.diagnostics.iter().next().unwrap().summary, "Import error");
    }
}
