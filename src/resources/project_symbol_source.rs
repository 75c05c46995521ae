use async_trait::async_trait;

use super::{api_error, checked, found, gone, known_str, Outcome, Resource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::diagnostics::{import_error, not_found, Diagnostic, Diagnostics};
use crate::id::split_three_part_id;
use crate::models::{
    create_symbol_source, delete_symbol_source, list_symbol_sources, update_symbol_source, ProjectScope,
    SymbolSource, SymbolSourceLayout, LAYOUT_CASINGS, LAYOUT_TYPES, SOURCE_TYPES,
};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::validation;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolSourceLayoutModel {
    pub layout_type: Value<String>,
    pub casing: Value<String>,
}

/// State of `sentry_project_symbol_source`. The id is the source's own id.
///
/// The Service never returns `password`, `secret_key`, `private_key` or
/// `app_connect_private_key`; those stay as planned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectSymbolSourceModel {
    pub id: Value<String>,
    pub organization: Value<String>,
    pub project: Value<String>,
    pub source_type: Value<String>,
    pub name: Value<String>,
    pub layout: Value<SymbolSourceLayoutModel>,
    pub app_connect_issuer: Value<String>,
    pub app_connect_private_key: Value<String>,
    pub app_id: Value<String>,
    pub url: Value<String>,
    pub username: Value<String>,
    pub password: Value<String>,
    pub bucket: Value<String>,
    pub region: Value<String>,
    pub access_key: Value<String>,
    pub secret_key: Value<String>,
    pub prefix: Value<String>,
    pub client_email: Value<String>,
    pub private_key: Value<String>,
}

impl ProjectSymbolSourceModel {
    fn scope(&self) -> Result<ProjectScope, Diagnostic> {
        Ok(ProjectScope::new(
            known_str(&self.organization, "organization")?,
            known_str(&self.project, "project")?,
        ))
    }

    fn fill(&mut self, source: &SymbolSource) {
        self.id = Value::from_option(source.id.clone());
        self.source_type = Value::known(source.source_type.as_str());
        self.name = Value::known(source.name.as_str());
        self.layout = Value::from_option(source.layout.as_ref().map(|layout| SymbolSourceLayoutModel {
            layout_type: Value::known(layout.layout_type.as_str()),
            casing: Value::known(layout.casing.as_str()),
        }));
        self.app_connect_issuer = Value::from_option(source.app_connect_issuer.clone());
        self.app_id = Value::from_option(source.app_id.clone());
        self.url = Value::from_option(source.url.clone());
        self.username = Value::from_option(source.username.clone());
        self.bucket = Value::from_option(source.bucket.clone());
        self.region = Value::from_option(source.region.clone());
        self.access_key = Value::from_option(source.access_key.clone());
        self.prefix = Value::from_option(source.prefix.clone());
        self.client_email = Value::from_option(source.client_email.clone());
    }

    fn to_request(&self) -> SymbolSource {
        SymbolSource {
            id: self.id.to_option(),
            source_type: self.source_type.to_option().unwrap_or_default(),
            name: self.name.to_option().unwrap_or_default(),
            layout: self.layout.as_known().and_then(|layout| {
                Some(SymbolSourceLayout {
                    layout_type: layout.layout_type.to_option()?,
                    casing: layout.casing.to_option()?,
                })
            }),
            app_connect_issuer: self.app_connect_issuer.to_option(),
            app_connect_private_key: self.app_connect_private_key.to_option(),
            app_id: self.app_id.to_option(),
            url: self.url.to_option(),
            username: self.username.to_option(),
            password: self.password.to_option(),
            bucket: self.bucket.to_option(),
            region: self.region.to_option(),
            access_key: self.access_key.to_option(),
            secret_key: self.secret_key.to_option(),
            prefix: self.prefix.to_option(),
            client_email: self.client_email.to_option(),
            private_key: self.private_key.to_option(),
        }
    }
}

pub struct ProjectSymbolSourceResource {
    client: SentryClient,
}

impl ProjectSymbolSourceResource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for ProjectSymbolSourceResource {
    type Model = ProjectSymbolSourceModel;

    const TYPE_NAME: &'static str = "project_symbol_source";

    fn schema() -> Schema {
        let secret = |description: &str| Attribute::optional_string().sensitive().with_description(description);
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
                "type",
                Attribute::required_string()
                    .with_description("The type of symbol source: appStoreConnect, http, gcs or s3."),
            )
            .with_attribute(
                "name",
                Attribute::required_string().with_description("The human-readable name of the source."),
            )
            .with_attribute(
                "layout",
                Attribute::optional(AttributeType::object([
                    ("type", Attribute::required_string()),
                    ("casing", Attribute::required_string()),
                ]))
                .with_description("Layout settings. Required for HTTP, GCS and S3 sources, invalid for App Store Connect."),
            )
            .with_attribute("app_connect_issuer", Attribute::optional_string())
            .with_attribute(
                "app_connect_private_key",
                secret("The App Store Connect API private key."),
            )
            .with_attribute("app_id", Attribute::optional_string())
            .with_attribute("url", Attribute::optional_string())
            .with_attribute("username", Attribute::optional_string())
            .with_attribute("password", secret("The password for HTTP sources."))
            .with_attribute("bucket", Attribute::optional_string())
            .with_attribute("region", Attribute::optional_string())
            .with_attribute("access_key", Attribute::optional_string())
            .with_attribute("secret_key", secret("The AWS secret access key."))
            .with_attribute("prefix", Attribute::optional_string())
            .with_attribute("client_email", Attribute::optional_string())
            .with_attribute("private_key", secret("The GCS service account private key."))
    }

    fn validate(model: &ProjectSymbolSourceModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validation::one_of(&mut diags, "type", &model.source_type, SOURCE_TYPES);
        if let Some(layout) = model.layout.as_known() {
            validation::one_of(&mut diags, "layout.type", &layout.layout_type, LAYOUT_TYPES);
            validation::one_of(&mut diags, "layout.casing", &layout.casing, LAYOUT_CASINGS);
        }
        diags
    }

    async fn create(&self, mut plan: ProjectSymbolSourceModel) -> Outcome<ProjectSymbolSourceModel> {
        try_outcome!(checked::<Self>(&plan));
        let scope = try_outcome!(plan.scope());
        let mut request = plan.to_request();
        request.id = None;
        let source = try_outcome!(create_symbol_source(&self.client, &scope, &request)
            .await
            .map_err(api_error("create")));
        plan.fill(&source);
        Outcome::set(plan)
    }

    async fn read(&self, mut state: ProjectSymbolSourceModel) -> Outcome<ProjectSymbolSourceModel> {
        let scope = try_outcome!(state.scope());
        let id = try_outcome!(known_str(&state.id, "id")).to_string();
        let Some(sources) = try_outcome!(found(
            list_symbol_sources(&self.client, &scope, Some(&id)).await,
            "read"
        )) else {
            return Outcome::remove();
        };
        let [source] = sources.as_slice() else {
            tracing::debug!(id = %id, count = sources.len(), "symbol source not found");
            return Outcome::remove();
        };
        state.fill(source);
        Outcome::set(state)
    }

    async fn update(
        &self,
        mut plan: ProjectSymbolSourceModel,
        state: ProjectSymbolSourceModel,
    ) -> Outcome<ProjectSymbolSourceModel> {
        try_outcome!(checked::<Self>(&plan));
        let scope = try_outcome!(plan.scope());
        let id = try_outcome!(known_str(&state.id, "id")).to_string();
        plan.id = Value::known(id.as_str());
        let Some(source) = try_outcome!(found(
            update_symbol_source(&self.client, &scope, &id, &plan.to_request()).await,
            "update"
        )) else {
            return Outcome::failed(not_found("symbol source"));
        };
        plan.fill(&source);
        Outcome::set(plan)
    }

    async fn delete(&self, state: ProjectSymbolSourceModel) -> Outcome<ProjectSymbolSourceModel> {
        let scope = try_outcome!(state.scope());
        let id = try_outcome!(known_str(&state.id, "id"));
        try_outcome!(gone(delete_symbol_source(&self.client, &scope, id).await, "delete"));
        Outcome::remove()
    }

    async fn import_state(&self, id: &str) -> Outcome<ProjectSymbolSourceModel> {
        let (organization, project, source_id) = try_outcome!(split_three_part_id(
            id,
            "organization",
            "project-slug",
            "source-id"
        )
        .map_err(import_error));
        Outcome::set(ProjectSymbolSourceModel {
            id: Value::Known(source_id),
            organization: Value::Known(organization),
            project: Value::Known(project),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s3_plan() -> ProjectSymbolSourceModel {
        ProjectSymbolSourceModel {
            organization: Value::from("acme"),
            project: Value::from("ios"),
            source_type: Value::from("s3"),
            name: Value::from("symbols"),
            layout: Value::Known(SymbolSourceLayoutModel {
                layout_type: Value::from("native"),
                casing: Value::from("lowercase"),
            }),
            bucket: Value::from("bucket"),
            region: Value::from("us-east-2"),
            access_key: Value::from("AKIA"),
            secret_key: Value::from("shh"),
            ..Default::default()
        }
    }

    #[test]
    fn test_request_carries_secret() {
        let body = serde_json::to_value(s3_plan().to_request()).unwrap();
        assert_eq!(body["secret_key"], json!("shh"));
        assert_eq!(body["layout"], json!({"type": "native", "casing": "lowercase"}));
        assert!(body.get("id").is_none());
    }

    #[test]
    fn test_fill_keeps_secret_from_plan() {
        let mut model = s3_plan();
        let source: SymbolSource = serde_json::from_value(json!({
            "id": "d3b3b7c6",
            "type": "s3",
            "name": "symbols",
            "layout": {"type": "native", "casing": "lowercase"},
            "bucket": "bucket",
            "region": "us-east-2",
            "access_key": "AKIA"
        }))
        .unwrap();
        model.fill(&source);
        assert_eq!(model.id, Value::from("d3b3b7c6"));
        assert_eq!(model.secret_key, Value::from("shh"));
        assert_eq!(model.url, Value::Null);
    }

    #[test]
    fn test_validate_layout() {
        let mut model = s3_plan();
        model.layout = Value::Known(SymbolSourceLayoutModel {
            layout_type: Value::from("flat"),
            casing: Value::from("default"),
        });
        let diags = ProjectSymbolSourceResource::validate(&model);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.iter().next().unwrap().attribute.as_deref(), Some("layout.type"));
    }
}
