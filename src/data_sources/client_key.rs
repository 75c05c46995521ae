use async_trait::async_trait;

use super::{lookup, DataSource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::models::{ClientKey, ClientKeyId, ClientKeyListQuery, ProjectScope};
use crate::resources::{api_error, known_str, try_outcome, ClientKeyModel, Outcome};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::traits::{Get, List};
use crate::validation;

pub const CLIENT_KEY_STATUSES: &[&str] = &["active", "inactive"];

fn key_attributes() -> Vec<(&'static str, Attribute)> {
    vec![
        ("project_id", Attribute::computed_string().with_description("The ID of the project that the key belongs to.")),
        ("rate_limit_window", Attribute::computed(AttributeType::Int64).with_description("Length of time in seconds that will be considered when checking the rate limit.")),
        ("rate_limit_count", Attribute::computed(AttributeType::Int64).with_description("Number of events that can be reported within the rate limit window.")),
        ("public", Attribute::computed_string().with_description("The public key.")),
        ("secret", Attribute::computed_string().sensitive().with_description("The secret key.")),
        ("dsn", Attribute::computed(AttributeType::map(AttributeType::String)).with_description("The DSN variants of the key.")),
        ("dsn_public", Attribute::computed_string().with_description("The DSN tells the SDK where to send the events to.")),
        ("dsn_secret", Attribute::computed_string().sensitive().with_description("Deprecated DSN includes a secret which is no longer required by newer SDK versions.")),
        ("dsn_csp", Attribute::computed_string().with_description("Security header endpoint for features like CSP and Expect-CT reports.")),
        (
            "javascript_loader_script",
            Attribute::computed(AttributeType::object([
                ("browser_sdk_version", Attribute::computed_string()),
                ("performance_monitoring_enabled", Attribute::computed(AttributeType::Bool)),
                ("session_replay_enabled", Attribute::computed(AttributeType::Bool)),
                ("debug_enabled", Attribute::computed(AttributeType::Bool)),
            ])),
        ),
    ]
}

/// `sentry_key`: one key of a project, picked by id, by name, or as the
/// only or oldest key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientKeyDataModel {
    pub first: Value<bool>,
    pub key: ClientKeyModel,
}

/// Pick a key out of a full listing.
pub fn select_key(mut keys: Vec<ClientKey>, name: Option<&str>, first: bool) -> Result<ClientKey, Diagnostic> {
    let no_key = || Diagnostic::error("Client error").with_detail("No key found");
    if let Some(name) = name {
        return keys.into_iter().find(|key| key.name == name).ok_or_else(no_key);
    }
    if keys.len() == 1 {
        return keys.pop().ok_or_else(no_key);
    }
    if first {
        keys.sort_by_key(|key| key.date_created);
        return keys.into_iter().next().ok_or_else(no_key);
    }
    if keys.is_empty() {
        return Err(no_key());
    }
    Err(Diagnostic::error("Client error")
        .with_detail("Multiple keys found, please specify the key by name, id, or set the first flag to true."))
}

pub struct ClientKeyDataSource {
    client: SentryClient,
}

impl ClientKeyDataSource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for ClientKeyDataSource {
    type Model = ClientKeyDataModel;

    const TYPE_NAME: &'static str = "key";

    fn schema() -> Schema {
        key_attributes().into_iter().fold(
            Schema::v0()
                .with_attribute("organization", Attribute::organization())
                .with_attribute("project", Attribute::required_string().with_description("The slug of the project the key belongs to."))
                .with_attribute("id", Attribute::optional_computed(AttributeType::String).with_description("The ID of this key."))
                .with_attribute("name", Attribute::optional_computed(AttributeType::String).with_description("The name of the key to look up."))
                .with_attribute(
                    "first",
                    Attribute::optional(AttributeType::Bool)
                        .with_description("Pick the oldest key when several match. Applies when neither `id` nor `name` is set."),
                ),
            |schema, (name, attribute)| schema.with_attribute(name, attribute),
        )
    }

    async fn read(&self, mut config: ClientKeyDataModel) -> Outcome<ClientKeyDataModel> {
        let organization = try_outcome!(known_str(&config.key.organization, "organization")).to_string();
        let project = try_outcome!(known_str(&config.key.project, "project")).to_string();
        let scope = ProjectScope::new(organization.as_str(), project.as_str());

        let key = match config.key.id.as_deref() {
            Some(key_id) => try_outcome!(lookup(
                ClientKey::get(
                    &self.client,
                    ClientKeyId {
                        scope,
                        key_id: key_id.to_string(),
                    }
                )
                .await,
                "client key"
            )),
            None => {
                let keys = try_outcome!(ClientKey::list_all(&self.client, &ClientKeyListQuery::from(scope))
                    .await
                    .map_err(api_error("read")));
                let first = config.first.as_known().copied().unwrap_or(false);
                try_outcome!(select_key(keys, config.key.name.as_deref(), first))
            }
        };
        config.key.fill(&organization, &project, &key);
        Outcome::set(config)
    }
}

/// `sentry_all_keys`: every key of a project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllClientKeysDataModel {
    pub organization: Value<String>,
    pub project: Value<String>,
    pub filter_status: Value<String>,
    pub keys: Value<Vec<ClientKeyModel>>,
}

pub struct AllClientKeysDataSource {
    client: SentryClient,
}

impl AllClientKeysDataSource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }

    pub fn validate(model: &AllClientKeysDataModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validation::one_of(&mut diags, "filter_status", &model.filter_status, CLIENT_KEY_STATUSES);
        diags
    }
}

#[async_trait]
impl DataSource for AllClientKeysDataSource {
    type Model = AllClientKeysDataModel;

    const TYPE_NAME: &'static str = "all_keys";

    fn schema() -> Schema {
        let key = AttributeType::object(key_attributes().into_iter().chain([
            ("id", Attribute::computed_string()),
            ("name", Attribute::computed_string()),
            ("organization", Attribute::computed_string()),
            ("project", Attribute::computed_string()),
        ]));
        Schema::v0()
            .with_attribute("organization", Attribute::organization())
            .with_attribute("project", Attribute::required_string().with_description("The slug of the project the keys belong to."))
            .with_attribute(
                "filter_status",
                Attribute::optional_string().with_description("Filter client keys by `active` or `inactive`."),
            )
            .with_attribute("keys", Attribute::computed(AttributeType::list(key)).with_description("The keys of the project."))
    }

    async fn read(&self, mut config: AllClientKeysDataModel) -> Outcome<AllClientKeysDataModel> {
        let diags = Self::validate(&config);
        if diags.has_error() {
            return Outcome::failed(diags);
        }
        let organization = try_outcome!(known_str(&config.organization, "organization")).to_string();
        let project = try_outcome!(known_str(&config.project, "project")).to_string();
        let query = ClientKeyListQuery {
            scope: ProjectScope::new(organization.as_str(), project.as_str()),
            status: config.filter_status.to_option(),
        };
        let keys = try_outcome!(ClientKey::list_all(&self.client, &query).await.map_err(api_error("read")));
        config.keys = Value::Known(
            keys.iter()
                .map(|key| {
                    let mut model = ClientKeyModel::default();
                    model.fill(&organization, &project, key);
                    model
                })
                .collect(),
        );
        Outcome::set(config)
    }
}
