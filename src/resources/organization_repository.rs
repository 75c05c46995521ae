use async_trait::async_trait;

use super::{api_error, checked, found, gone, known_str, Outcome, Resource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::diagnostics::{fill_error, import_error, not_supported, Diagnostic, Diagnostics};
use crate::id::split_four_part_id;
use crate::models::{
    create_repository, delete_repository, CreateRepositoryRequest, OrganizationRepository, RepositoryListQuery,
};
use crate::schema::{Attribute, Schema};
use crate::traits::List;
use crate::validation;

pub const REPOSITORY_INTEGRATION_TYPES: &[&str] = &[
    "github",
    "github_enterprise",
    "gitlab",
    "vsts",
    "bitbucket",
    "bitbucket_server",
];

/// State of `sentry_organization_repository`. The id is the repository id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizationRepositoryModel {
    pub id: Value<String>,
    pub organization: Value<String>,
    pub integration_type: Value<String>,
    pub integration_id: Value<String>,
    pub identifier: Value<String>,
}

impl OrganizationRepositoryModel {
    fn fill(&mut self, organization: &str, repo: &OrganizationRepository) -> Result<(), String> {
        self.identifier = Value::Known(repo.identifier()?);
        self.id = Value::known(repo.id.as_str());
        self.organization = Value::known(organization);
        self.integration_type = Value::known(repo.integration_type());
        self.integration_id = Value::from_option(repo.integration_id.clone());
        Ok(())
    }

    fn to_request(&self) -> Result<CreateRepositoryRequest, Diagnostic> {
        Ok(CreateRepositoryRequest::new(
            known_str(&self.integration_type, "integration_type")?,
            known_str(&self.integration_id, "integration_id")?,
            known_str(&self.identifier, "identifier")?,
        ))
    }
}

pub struct OrganizationRepositoryResource {
    client: SentryClient,
}

impl OrganizationRepositoryResource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for OrganizationRepositoryResource {
    type Model = OrganizationRepositoryModel;

    const TYPE_NAME: &'static str = "organization_repository";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::id())
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "integration_type",
                Attribute::required_string()
                    .with_requires_replace()
                    .with_description("The type of the organization integration."),
            )
            .with_attribute(
                "integration_id",
                Attribute::required_string()
                    .with_requires_replace()
                    .with_description("The organization integration ID."),
            )
            .with_attribute(
                "identifier",
                Attribute::required_string()
                    .with_requires_replace()
                    .with_description("The repository identifier, e.g. `owner/repo` on GitHub."),
            )
    }

    fn validate(model: &OrganizationRepositoryModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validation::one_of(
            &mut diags,
            "integration_type",
            &model.integration_type,
            REPOSITORY_INTEGRATION_TYPES,
        );
        diags
    }

    async fn create(&self, mut plan: OrganizationRepositoryModel) -> Outcome<OrganizationRepositoryModel> {
        try_outcome!(checked::<Self>(&plan));
        let organization = try_outcome!(known_str(&plan.organization, "organization")).to_string();
        let request = try_outcome!(plan.to_request());
        let repo = try_outcome!(create_repository(&self.client, &organization, &request)
            .await
            .map_err(api_error("create")));
        try_outcome!(plan.fill(&organization, &repo).map_err(fill_error));
        Outcome::set(plan)
    }

    async fn read(&self, mut state: OrganizationRepositoryModel) -> Outcome<OrganizationRepositoryModel> {
        let organization = try_outcome!(known_str(&state.organization, "organization")).to_string();
        let id = try_outcome!(known_str(&state.id, "id")).to_string();
        let query = RepositoryListQuery {
            organization: organization.clone(),
            integration_id: state.integration_id.to_option(),
        };
        let Some(repos) = try_outcome!(found(
            OrganizationRepository::list_all(&self.client, &query).await,
            "read"
        )) else {
            return Outcome::remove();
        };
        let Some(repo) = repos.iter().find(|repo| repo.id == id) else {
            tracing::debug!(repository = %id, "repository no longer listed");
            return Outcome::remove();
        };
        try_outcome!(state.fill(&organization, repo).map_err(fill_error));
        Outcome::set(state)
    }

    async fn update(
        &self,
        plan: OrganizationRepositoryModel,
        _state: OrganizationRepositoryModel,
    ) -> Outcome<OrganizationRepositoryModel> {
        try_outcome!(checked::<Self>(&plan));
        Outcome::failed(not_supported("update"))
    }

    async fn delete(&self, state: OrganizationRepositoryModel) -> Outcome<OrganizationRepositoryModel> {
        let organization = try_outcome!(known_str(&state.organization, "organization"));
        let id = try_outcome!(known_str(&state.id, "id"));
        try_outcome!(gone(delete_repository(&self.client, organization, id).await, "delete"));
        Outcome::remove()
    }

    async fn import_state(&self, id: &str) -> Outcome<OrganizationRepositoryModel> {
        let (organization, integration_type, integration_id, repo_id) = try_outcome!(split_four_part_id(
            id,
            "organization",
            "integration-type",
            "integration-id",
            "id"
        )
        .map_err(import_error));
        Outcome::set(OrganizationRepositoryModel {
            id: Value::Known(repo_id),
            organization: Value::Known(organization),
            integration_type: Value::Known(integration_type),
            integration_id: Value::Known(integration_id),
            ..Default::default()
        })
    }
}
