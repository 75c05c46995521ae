use async_trait::async_trait;
use chrono::SecondsFormat;

use super::{lookup, DataSource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::models::{Project, ProjectScope};
use crate::resources::{known_str, try_outcome, Outcome};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::traits::Get;

/// `sentry_project`, also the element of `sentry_all_projects`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectDataModel {
    pub id: Value<String>,
    pub organization: Value<String>,
    pub slug: Value<String>,
    pub internal_id: Value<String>,
    pub name: Value<String>,
    pub platform: Value<String>,
    pub date_created: Value<String>,
    pub features: Value<Vec<String>>,
    pub color: Value<String>,
    pub is_public: Value<bool>,
    pub status: Value<String>,
}

impl ProjectDataModel {
    pub fn fill(&mut self, organization: &str, project: &Project) {
        self.id = Value::known(project.slug.as_str());
        self.organization = Value::known(project.organization_slug().unwrap_or(organization));
        self.slug = Value::known(project.slug.as_str());
        self.internal_id = Value::known(project.id.as_str());
        self.name = Value::known(project.name.as_str());
        self.platform = Value::from_option(project.platform.clone());
        self.date_created = Value::from_option(
            project
                .date_created
                .map(|at| at.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        );
        self.features = Value::Known(project.features.clone());
        self.color = Value::from_option(project.color.clone());
        self.is_public = Value::from_option(project.is_public);
        self.status = Value::from_option(project.status.clone());
    }

    /// Attributes of one project, shared with the listing.
    pub(crate) fn attributes() -> Vec<(&'static str, Attribute)> {
        vec![
            ("id", Attribute::computed_string().with_description("The slug of this project.")),
            ("internal_id", Attribute::computed_string().with_description("The internal ID for this project.")),
            ("name", Attribute::computed_string().with_description("The name of this project.")),
            ("platform", Attribute::computed_string().with_description("The platform of this project.")),
            ("date_created", Attribute::computed_string().with_description("The date this project was created.")),
            (
                "features",
                Attribute::computed(AttributeType::set(AttributeType::String))
                    .with_description("The features of this project."),
            ),
            ("color", Attribute::computed_string().with_description("The color of this project.")),
            ("is_public", Attribute::computed(AttributeType::Bool).with_description("Whether this project is public.")),
            ("status", Attribute::computed_string().with_description("The status of this project.")),
        ]
    }
}

pub struct ProjectDataSource {
    client: SentryClient,
}

impl ProjectDataSource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for ProjectDataSource {
    type Model = ProjectDataModel;

    const TYPE_NAME: &'static str = "project";

    fn schema() -> Schema {
        ProjectDataModel::attributes().into_iter().fold(
            Schema::v0()
                .with_attribute("organization", Attribute::organization())
                .with_attribute(
                    "slug",
                    Attribute::required_string().with_description("The unique URL slug for this project."),
                ),
            |schema, (name, attribute)| schema.with_attribute(name, attribute),
        )
    }

    async fn read(&self, mut config: ProjectDataModel) -> Outcome<ProjectDataModel> {
        let organization = try_outcome!(known_str(&config.organization, "organization")).to_string();
        let slug = try_outcome!(known_str(&config.slug, "slug")).to_string();
        let project = try_outcome!(lookup(
            Project::get(&self.client, ProjectScope::new(organization.as_str(), slug)).await,
            "project"
        ));
        config.fill(&organization, &project);
        Outcome::set(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fill() {
        let project: Project = serde_json::from_value(json!({
            "id": 4505321021243392_i64,
            "slug": "web",
            "name": "Web",
            "platform": "python",
            "dateCreated": "2023-06-08T00:13:06.004534Z",
            "features": ["releases"],
            "color": "#bf6e3f",
            "isPublic": false,
            "organization": {"id": "1", "slug": "acme", "name": "Acme"}
        }))
        .unwrap();
        let mut model = ProjectDataModel::default();
        model.fill("ignored", &project);
        assert_eq!(model.organization, Value::from("acme"));
        assert_eq!(model.internal_id, Value::from("4505321021243392"));
        assert_eq!(model.date_created, Value::from("2023-06-08T00:13:06.004534Z"));
        assert_eq!(model.is_public, Value::Known(false));
        assert_eq!(model.status, Value::Null);
    }
}
