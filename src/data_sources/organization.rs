use async_trait::async_trait;

use super::{lookup, DataSource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::models::Organization;
use crate::resources::{known_str, try_outcome, Outcome};
use crate::schema::{Attribute, Schema};
use crate::traits::Get;

/// `sentry_organization`: looked up by slug.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizationDataModel {
    pub id: Value<String>,
    pub slug: Value<String>,
    pub name: Value<String>,
    pub internal_id: Value<String>,
}

impl OrganizationDataModel {
    pub fn fill(&mut self, organization: &Organization) {
        self.id = Value::known(organization.slug.as_str());
        self.slug = Value::known(organization.slug.as_str());
        self.name = Value::known(organization.name.as_str());
        self.internal_id = Value::known(organization.id.as_str());
    }
}

pub struct OrganizationDataSource {
    client: SentryClient,
}

impl OrganizationDataSource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for OrganizationDataSource {
    type Model = OrganizationDataModel;

    const TYPE_NAME: &'static str = "organization";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string().with_description("The slug of this organization."))
            .with_attribute(
                "slug",
                Attribute::required_string().with_description("The unique URL slug for this organization."),
            )
            .with_attribute("name", Attribute::computed_string().with_description("The human readable name for this organization."))
            .with_attribute("internal_id", Attribute::computed_string().with_description("The internal ID for this organization."))
    }

    async fn read(&self, mut config: OrganizationDataModel) -> Outcome<OrganizationDataModel> {
        let slug = try_outcome!(known_str(&config.slug, "slug")).to_string();
        let organization = try_outcome!(lookup(Organization::get(&self.client, slug).await, "organization"));
        config.fill(&organization);
        Outcome::set(config)
    }
}
