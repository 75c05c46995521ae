use async_trait::async_trait;

use super::{lookup, DataSource};
use crate::client::SentryClient;
use crate::models::Team;
use crate::resources::{known_str, try_outcome, Outcome, TeamModel};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::traits::Get;

/// `sentry_team`: looked up by organization and slug. Shares the model of
/// the team resource.
pub struct TeamDataSource {
    client: SentryClient,
}

impl TeamDataSource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for TeamDataSource {
    type Model = TeamModel;

    const TYPE_NAME: &'static str = "team";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string().with_description("The slug of this team."))
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "slug",
                Attribute::required_string().with_description("The unique URL slug for this team."),
            )
            .with_attribute("name", Attribute::computed_string().with_description("The human readable name for this team."))
            .with_attribute("internal_id", Attribute::computed_string().with_description("The internal ID for this team."))
            .with_attribute("has_access", Attribute::computed(AttributeType::Bool))
            .with_attribute("is_pending", Attribute::computed(AttributeType::Bool))
            .with_attribute("is_member", Attribute::computed(AttributeType::Bool))
    }

    async fn read(&self, mut config: TeamModel) -> Outcome<TeamModel> {
        let organization = try_outcome!(known_str(&config.organization, "organization")).to_string();
        let slug = try_outcome!(known_str(&config.slug, "slug")).to_string();
        let team = try_outcome!(lookup(Team::get(&self.client, (organization.clone(), slug)).await, "team"));
        config.fill(&organization, &team);
        Outcome::set(config)
    }
}
