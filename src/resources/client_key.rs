use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{api_error, checked, found, gone, known_str, Outcome, Resource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::diagnostics::{import_error, not_found, Diagnostic, Diagnostics};
use crate::id::split_three_part_id;
use crate::models::{
    create_client_key, delete_client_key, update_client_key, ClientKey, ClientKeyId, ClientKeyRequest,
    DynamicSdkLoaderOptions, ProjectScope, RateLimit,
};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::traits::Get;
use crate::validation;

/// Settings of the JavaScript Loader Script served for the key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JavascriptLoaderScriptModel {
    pub browser_sdk_version: Value<String>,
    pub performance_monitoring_enabled: Value<bool>,
    pub session_replay_enabled: Value<bool>,
    pub debug_enabled: Value<bool>,
}

impl JavascriptLoaderScriptModel {
    fn from_key(key: &ClientKey) -> Self {
        Self {
            browser_sdk_version: Value::known(key.browser_sdk_version.as_str()),
            performance_monitoring_enabled: Value::Known(key.dynamic_sdk_loader_options.has_performance),
            session_replay_enabled: Value::Known(key.dynamic_sdk_loader_options.has_replay),
            debug_enabled: Value::Known(key.dynamic_sdk_loader_options.has_debug),
        }
    }

    fn loader_options(&self) -> Option<DynamicSdkLoaderOptions> {
        Some(DynamicSdkLoaderOptions {
            has_performance: *self.performance_monitoring_enabled.as_known()?,
            has_replay: *self.session_replay_enabled.as_known()?,
            has_debug: *self.debug_enabled.as_known()?,
        })
    }
}

/// State of `sentry_key`. The id is the key id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientKeyModel {
    pub id: Value<String>,
    pub organization: Value<String>,
    pub project: Value<String>,
    pub project_id: Value<String>,
    pub name: Value<String>,
    pub rate_limit_window: Value<i64>,
    pub rate_limit_count: Value<i64>,
    pub javascript_loader_script: Value<JavascriptLoaderScriptModel>,
    pub public: Value<String>,
    pub secret: Value<String>,
    pub dsn: Value<BTreeMap<String, String>>,
    pub dsn_public: Value<String>,
    pub dsn_secret: Value<String>,
    pub dsn_csp: Value<String>,
}

impl ClientKeyModel {
    pub fn fill(&mut self, organization: &str, project: &str, key: &ClientKey) {
        self.id = Value::known(key.id.as_str());
        self.organization = Value::known(organization);
        self.project = Value::known(project);
        self.project_id = Value::known(key.project_id.as_str());
        self.name = Value::known(key.name.as_str());
        match key.rate_limit {
            Some(RateLimit { window, count }) => {
                self.rate_limit_window = Value::Known(window);
                self.rate_limit_count = Value::Known(count);
            }
            None => {
                self.rate_limit_window = Value::Null;
                self.rate_limit_count = Value::Null;
            }
        }
        self.javascript_loader_script = Value::Known(JavascriptLoaderScriptModel::from_key(key));
        self.public = Value::known(key.public.as_str());
        self.secret = Value::known(key.secret.as_str());
        self.dsn = Value::Known(key.dsn_strings());
        self.dsn_public = Value::from_option(key.dsn_of("public"));
        self.dsn_secret = Value::from_option(key.dsn_of("secret"));
        self.dsn_csp = Value::from_option(key.dsn_of("csp"));
    }

    fn scope(&self) -> Result<ProjectScope, Diagnostic> {
        Ok(ProjectScope::new(
            known_str(&self.organization, "organization")?,
            known_str(&self.project, "project")?,
        ))
    }

    fn rate_limit(&self) -> Option<RateLimit> {
        Some(RateLimit {
            window: *self.rate_limit_window.as_known()?,
            count: *self.rate_limit_count.as_known()?,
        })
    }

    /// With a prior state, a rate limit removed from the plan is cleared.
    fn to_request(&self, state: Option<&ClientKeyModel>) -> ClientKeyRequest {
        let rate_limit = match (self.rate_limit(), state.and_then(ClientKeyModel::rate_limit)) {
            (Some(limit), _) => Some(Some(limit)),
            (None, Some(_)) if self.rate_limit_window.is_null() && self.rate_limit_count.is_null() => Some(None),
            (None, _) => None,
        };
        let loader = self.javascript_loader_script.as_known();
        ClientKeyRequest {
            name: self.name.to_option(),
            rate_limit,
            browser_sdk_version: loader.and_then(|l| l.browser_sdk_version.to_option()),
            dynamic_sdk_loader_options: loader.and_then(JavascriptLoaderScriptModel::loader_options),
        }
    }
}

pub struct ClientKeyResource {
    client: SentryClient,
}

impl ClientKeyResource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for ClientKeyResource {
    type Model = ClientKeyModel;

    const TYPE_NAME: &'static str = "key";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::id())
            .with_attribute("organization", Attribute::organization().with_state_for_unknown())
            .with_attribute(
                "project",
                Attribute::required_string()
                    .with_state_for_unknown()
                    .with_description("The slug of the project the resource belongs to."),
            )
            .with_attribute("project_id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string().with_description("The name of the client key."))
            .with_attribute(
                "rate_limit_window",
                Attribute::optional_computed(AttributeType::Int64)
                    .with_state_for_unknown()
                    .with_description("Length of time that will be considered when checking the rate limit."),
            )
            .with_attribute(
                "rate_limit_count",
                Attribute::optional_computed(AttributeType::Int64)
                    .with_state_for_unknown()
                    .with_description("Number of events that can be reported within the rate limit window."),
            )
            .with_attribute(
                "javascript_loader_script",
                Attribute::optional_computed(AttributeType::object([
                    ("browser_sdk_version", Attribute::required_string()),
                    ("performance_monitoring_enabled", Attribute::optional_computed(AttributeType::Bool)),
                    ("session_replay_enabled", Attribute::optional_computed(AttributeType::Bool)),
                    ("debug_enabled", Attribute::optional_computed(AttributeType::Bool)),
                ]))
                .with_state_for_unknown(),
            )
            .with_attribute("public", Attribute::computed_string().with_description("The public key."))
            .with_attribute(
                "secret",
                Attribute::computed_string().sensitive().with_description("The secret key."),
            )
            .with_attribute("dsn", Attribute::computed(AttributeType::map(AttributeType::String)))
            .with_attribute(
                "dsn_public",
                Attribute::computed_string().with_description("The DSN tells the SDK where to send the events to."),
            )
            .with_attribute(
                "dsn_secret",
                Attribute::computed_string()
                    .deprecated("Use dsn_public; newer SDKs do not need the secret.")
                    .with_description("DSN including the secret key."),
            )
            .with_attribute(
                "dsn_csp",
                Attribute::computed_string()
                    .with_description("Security header endpoint for features like CSP and Expect-CT reports."),
            )
    }

    fn validate(model: &ClientKeyModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validation::required_together(
            &mut diags,
            &[
                ("rate_limit_window", !model.rate_limit_window.is_null()),
                ("rate_limit_count", !model.rate_limit_count.is_null()),
            ],
        );
        if let Some(loader) = model.javascript_loader_script.as_known() {
            validation::required_together(
                &mut diags,
                &[
                    (
                        "javascript_loader_script.performance_monitoring_enabled",
                        !loader.performance_monitoring_enabled.is_null(),
                    ),
                    (
                        "javascript_loader_script.session_replay_enabled",
                        !loader.session_replay_enabled.is_null(),
                    ),
                    ("javascript_loader_script.debug_enabled", !loader.debug_enabled.is_null()),
                ],
            );
        }
        diags
    }

    async fn create(&self, mut plan: ClientKeyModel) -> Outcome<ClientKeyModel> {
        try_outcome!(checked::<Self>(&plan));
        let scope = try_outcome!(plan.scope());
        let key = try_outcome!(create_client_key(&self.client, &scope, &plan.to_request(None))
            .await
            .map_err(api_error("create")));
        tracing::info!(project = %scope.project, key = %key.id, "created client key");
        plan.fill(&scope.organization, &scope.project, &key);
        Outcome::set(plan)
    }

    async fn read(&self, mut state: ClientKeyModel) -> Outcome<ClientKeyModel> {
        let scope = try_outcome!(state.scope());
        let key_id = try_outcome!(known_str(&state.id, "id")).to_string();
        let (organization, project) = (scope.organization.clone(), scope.project.clone());
        let Some(key) = try_outcome!(found(
            ClientKey::get(&self.client, ClientKeyId { scope, key_id }).await,
            "read"
        )) else {
            return Outcome::remove();
        };
        state.fill(&organization, &project, &key);
        Outcome::set(state)
    }

    async fn update(&self, mut plan: ClientKeyModel, state: ClientKeyModel) -> Outcome<ClientKeyModel> {
        try_outcome!(checked::<Self>(&plan));
        let scope = try_outcome!(plan.scope());
        let key_id = try_outcome!(known_str(&state.id, "id")).to_string();
        let (organization, project) = (scope.organization.clone(), scope.project.clone());
        let id = ClientKeyId { scope, key_id };
        let Some(key) = try_outcome!(found(
            update_client_key(&self.client, &id, &plan.to_request(Some(&state))).await,
            "update"
        )) else {
            return Outcome::remove().with_diagnostic(not_found("client key"));
        };
        plan.fill(&organization, &project, &key);
        Outcome::set(plan)
    }

    async fn delete(&self, state: ClientKeyModel) -> Outcome<ClientKeyModel> {
        let scope = try_outcome!(state.scope());
        let key_id = try_outcome!(known_str(&state.id, "id")).to_string();
        try_outcome!(gone(
            delete_client_key(&self.client, &ClientKeyId { scope, key_id }).await,
            "delete"
        ));
        Outcome::remove()
    }

    async fn import_state(&self, id: &str) -> Outcome<ClientKeyModel> {
        let (organization, project, key_id) = try_outcome!(split_three_part_id(
            id,
            "organization",
            "project-slug",
            "key-id"
        )
        .map_err(import_error));
        Outcome::set(ClientKeyModel {
            id: Value::Known(key_id),
            organization: Value::Known(organization),
            project: Value::Known(project),
            ..Default::default()
        })
    }
}
