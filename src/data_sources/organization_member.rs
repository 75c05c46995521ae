use async_trait::async_trait;

use super::DataSource;
use crate::attr::Value;
use crate::client::SentryClient;
use crate::diagnostics::{client_error, not_found, Diagnostic};
use crate::models::OrganizationMember;
use crate::resources::{known_str, try_outcome, Outcome};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::traits::List;

/// One member as the data sources show it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberDataModel {
    pub id: Value<String>,
    pub email: Value<String>,
    pub role: Value<String>,
}

impl MemberDataModel {
    pub fn from_member(member: &OrganizationMember) -> Self {
        Self {
            id: Value::known(member.id.as_str()),
            email: Value::known(member.email.as_str()),
            role: Value::known(member.organization_role()),
        }
    }
}

/// `sentry_organization_member`: looked up by email.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizationMemberDataModel {
    pub organization: Value<String>,
    pub member: MemberDataModel,
}

pub struct OrganizationMemberDataSource {
    client: SentryClient,
}

impl OrganizationMemberDataSource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

async fn list_members(client: &SentryClient, organization: &str) -> Result<Vec<OrganizationMember>, Diagnostic> {
    OrganizationMember::list_all(client, &organization.to_string())
        .await
        .map_err(|err| client_error("list organization members", err))
}

#[async_trait]
impl DataSource for OrganizationMemberDataSource {
    type Model = OrganizationMemberDataModel;

    const TYPE_NAME: &'static str = "organization_member";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "email",
                Attribute::required_string().with_description("The email of the organization member."),
            )
            .with_attribute("id", Attribute::computed_string().with_description("The ID of the organization member."))
            .with_attribute(
                "role",
                Attribute::computed_string().with_description("This is the role of the organization member."),
            )
    }

    async fn read(&self, mut config: OrganizationMemberDataModel) -> Outcome<OrganizationMemberDataModel> {
        let organization = try_outcome!(known_str(&config.organization, "organization")).to_string();
        let email = try_outcome!(known_str(&config.member.email, "email")).to_string();
        let members = try_outcome!(list_members(&self.client, &organization).await);
        let Some(member) = members.iter().find(|member| member.email == email) else {
            return Outcome::failed(not_found("organization member"));
        };
        config.member = MemberDataModel::from_member(member);
        Outcome::set(config)
    }
}

/// `sentry_all_organization_members`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllOrganizationMembersDataModel {
    pub organization: Value<String>,
    pub members: Value<Vec<MemberDataModel>>,
}

pub struct AllOrganizationMembersDataSource {
    client: SentryClient,
}

impl AllOrganizationMembersDataSource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for AllOrganizationMembersDataSource {
    type Model = AllOrganizationMembersDataModel;

    const TYPE_NAME: &'static str = "all_organization_members";

    fn schema() -> Schema {
        let member = AttributeType::object([
            ("id", Attribute::computed_string()),
            ("email", Attribute::computed_string()),
            ("role", Attribute::computed_string()),
        ]);
        Schema::v0()
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "members",
                Attribute::computed(AttributeType::list(member)).with_description("The members of the organization."),
            )
    }

    async fn read(&self, mut config: AllOrganizationMembersDataModel) -> Outcome<AllOrganizationMembersDataModel> {
        let organization = try_outcome!(known_str(&config.organization, "organization")).to_string();
        let members = try_outcome!(list_members(&self.client, &organization).await);
        config.members = Value::Known(members.iter().map(MemberDataModel::from_member).collect());
        Outcome::set(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_member_prefers_org_role() {
        let member: OrganizationMember = serde_json::from_value(json!({
            "id": "1",
            "email": "jane@example.com",
            "role": "member",
            "orgRole": "admin"
        }))
        .unwrap();
        let model = MemberDataModel::from_member(&member);
        assert_eq!(model.role, Value::from("admin"));
        assert_eq!(model.email, Value::from("jane@example.com"));
    }
}
