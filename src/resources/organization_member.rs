use async_trait::async_trait;

use super::{api_error, checked, found, gone, known_str, Outcome, Resource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::diagnostics::{import_error, not_found, Diagnostic, Diagnostics};
use crate::id::split_two_part_id;
use crate::models::{
    create_member, delete_member, update_member, CreateMemberRequest, OrganizationMember, UpdateMemberRequest,
};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::traits::Get;
use crate::validation;

/// State of `sentry_organization_member`. The id is the member id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizationMemberModel {
    pub id: Value<String>,
    pub organization: Value<String>,
    pub email: Value<String>,
    pub role: Value<String>,
    pub expired: Value<bool>,
    pub pending: Value<bool>,
}

impl OrganizationMemberModel {
    pub fn fill(&mut self, organization: &str, member: &OrganizationMember) {
        self.id = Value::known(member.id.as_str());
        self.organization = Value::known(organization);
        self.email = Value::known(member.email.as_str());
        self.role = Value::known(member.organization_role());
        self.expired = Value::Known(member.expired);
        self.pending = Value::Known(member.pending);
    }

    fn target(&self) -> Result<(&str, &str), Diagnostic> {
        Ok((
            known_str(&self.organization, "organization")?,
            known_str(&self.id, "id")?,
        ))
    }
}

pub struct OrganizationMemberResource {
    client: SentryClient,
}

impl OrganizationMemberResource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for OrganizationMemberResource {
    type Model = OrganizationMemberModel;

    const TYPE_NAME: &'static str = "organization_member";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::id())
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "email",
                Attribute::required_string()
                    .with_requires_replace()
                    .with_description("The email of the organization member."),
            )
            .with_attribute(
                "role",
                Attribute::required_string().with_description("This is the role of the organization member."),
            )
            .with_attribute(
                "expired",
                Attribute::computed(AttributeType::Bool).with_description("The invite has expired."),
            )
            .with_attribute(
                "pending",
                Attribute::computed(AttributeType::Bool).with_description("The invite is pending."),
            )
    }

    fn validate(model: &OrganizationMemberModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validation::not_empty(&mut diags, "email", &model.email);
        validation::not_empty(&mut diags, "role", &model.role);
        diags
    }

    async fn create(&self, mut plan: OrganizationMemberModel) -> Outcome<OrganizationMemberModel> {
        try_outcome!(checked::<Self>(&plan));
        let organization = try_outcome!(known_str(&plan.organization, "organization")).to_string();
        let request = CreateMemberRequest {
            email: plan.email.to_option().unwrap_or_default(),
            role: plan.role.to_option().unwrap_or_default(),
            teams: Vec::new(),
        };
        let member = try_outcome!(create_member(&self.client, &organization, &request)
            .await
            .map_err(api_error("create")));
        tracing::info!(organization = %organization, member = %member.id, "invited organization member");
        plan.fill(&organization, &member);
        Outcome::set(plan)
    }

    async fn read(&self, mut state: OrganizationMemberModel) -> Outcome<OrganizationMemberModel> {
        let (organization, member_id) = try_outcome!(state.target());
        let (organization, member_id) = (organization.to_string(), member_id.to_string());
        let Some(member) = try_outcome!(found(
            OrganizationMember::get(&self.client, (organization.clone(), member_id)).await,
            "read"
        )) else {
            return Outcome::remove();
        };
        state.fill(&organization, &member);
        Outcome::set(state)
    }

    async fn update(
        &self,
        mut plan: OrganizationMemberModel,
        state: OrganizationMemberModel,
    ) -> Outcome<OrganizationMemberModel> {
        try_outcome!(checked::<Self>(&plan));
        let (organization, member_id) = try_outcome!(state.target());
        let request = UpdateMemberRequest {
            role: plan.role.to_option().unwrap_or_default(),
        };
        let Some(member) = try_outcome!(found(
            update_member(&self.client, organization, member_id, &request).await,
            "update"
        )) else {
            return Outcome::remove().with_diagnostic(not_found("organization member"));
        };
        plan.fill(organization, &member);
        Outcome::set(plan)
    }

    async fn delete(&self, state: OrganizationMemberModel) -> Outcome<OrganizationMemberModel> {
        let (organization, member_id) = try_outcome!(state.target());
        try_outcome!(gone(
            delete_member(&self.client, organization, member_id).await,
            "delete"
        ));
        Outcome::remove()
    }

    async fn import_state(&self, id: &str) -> Outcome<OrganizationMemberModel> {
        let (organization, member_id) =
            try_outcome!(split_two_part_id(id, "organization", "member-id").map_err(import_error));
        Outcome::set(OrganizationMemberModel {
            id: Value::Known(member_id),
            organization: Value::Known(organization),
            ..Default::default()
        })
    }
}
