use async_trait::async_trait;

use super::{DataSource, ProjectDataModel};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::models::{Project, ProjectListQuery};
use crate::resources::{api_error, try_outcome, Outcome};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::traits::List;

/// `sentry_all_projects`: every project the token can see, optionally
/// narrowed to one organization and to a set of slugs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllProjectsDataModel {
    pub organization: Value<String>,
    pub project_slugs: Value<Vec<String>>,
    pub projects: Value<Vec<ProjectDataModel>>,
}

impl AllProjectsDataModel {
    fn query(&self) -> ProjectListQuery {
        match self.organization.as_deref() {
            Some(organization) => ProjectListQuery::organization(organization),
            None => ProjectListQuery::all(),
        }
    }

    pub fn fill(&mut self, projects: &[Project]) {
        let organization = self.organization.as_deref().unwrap_or_default().to_string();
        let wanted = self.project_slugs.as_known();
        self.projects = Value::Known(
            projects
                .iter()
                .filter(|project| wanted.map_or(true, |slugs| slugs.contains(&project.slug)))
                .map(|project| {
                    let mut model = ProjectDataModel::default();
                    model.fill(&organization, project);
                    model
                })
                .collect(),
        );
    }
}

pub struct AllProjectsDataSource {
    client: SentryClient,
}

impl AllProjectsDataSource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for AllProjectsDataSource {
    type Model = AllProjectsDataModel;

    const TYPE_NAME: &'static str = "all_projects";

    fn schema() -> Schema {
        let project = AttributeType::object(
            ProjectDataModel::attributes()
                .into_iter()
                .chain([("organization", Attribute::computed_string()), ("slug", Attribute::computed_string())]),
        );
        Schema::v0()
            .with_attribute(
                "organization",
                Attribute::optional_string().with_description("Only list the projects of this organization."),
            )
            .with_attribute(
                "project_slugs",
                Attribute::optional(AttributeType::set(AttributeType::String))
                    .with_description("Only keep the projects with these slugs."),
            )
            .with_attribute(
                "projects",
                Attribute::computed(AttributeType::list(project)).with_description("The matching projects."),
            )
    }

    async fn read(&self, mut config: AllProjectsDataModel) -> Outcome<AllProjectsDataModel> {
        let projects = try_outcome!(Project::list_all(&self.client, &config.query())
            .await
            .map_err(api_error("read")));
        tracing::debug!(count = projects.len(), "listed projects");
        config.fill(&projects);
        Outcome::set(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fill_filters_by_slug() {
        let projects: Vec<Project> = serde_json::from_value(json!([
            {"id": "1", "slug": "web", "name": "Web", "organization": {"id": "1", "slug": "acme", "name": "Acme"}},
            {"id": "2", "slug": "api", "name": "API", "organization": {"id": "1", "slug": "acme", "name": "Acme"}}
        ]))
        .unwrap();
        let mut model = AllProjectsDataModel {
            project_slugs: Value::Known(vec!["api".to_string()]),
            ..Default::default()
        };
        model.fill(&projects);
        let listed = model.projects.as_known().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].slug, Value::from("api"));
        assert_eq!(listed[0].organization, Value::from("acme"));
    }

    #[test]
    fn test_query_scopes_to_organization() {
        let model = AllProjectsDataModel {
            organization: Value::from("acme"),
            ..Default::default()
        };
        assert_eq!(model.query(), ProjectListQuery::organization("acme"));
        assert_eq!(AllProjectsDataModel::default().query(), ProjectListQuery::all());
    }
}
