use async_trait::async_trait;
use serde_json::{Map, Value as Json};

use super::{api_error, checked, found, gone, known_str, non_empty, Outcome, Resource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::diagnostics::{client_error, fill_error, import_error, not_found, Diagnostics};
use crate::error::Result;
use crate::id::split_two_part_id;
use crate::models::{
    add_project_team, create_project, delete_client_key, delete_project, remove_project_team, update_project,
    ClientKey, ClientKeyId, ClientKeyListQuery, CreateProjectRequest, Project, ProjectScope, UpdateProjectRequest,
    OPTION_BLACKLISTED_IPS, OPTION_ERROR_MESSAGES, OPTION_RELEASES,
};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::traits::{Get, List};
use crate::types::{join_set, preserve_trimmed, split_set, TrimmedString};
use crate::validation;

/// Name of the key the Service creates with every project.
const DEFAULT_KEY_NAME: &str = "Default";

/// Inbound filter lists kept in project options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFiltersModel {
    pub blacklisted_ips: Value<Vec<String>>,
    pub releases: Value<Vec<String>>,
    pub error_messages: Value<Vec<String>>,
}

impl ProjectFiltersModel {
    fn fill(&mut self, project: &Project) -> std::result::Result<(), String> {
        let split = |key: &str| -> std::result::Result<Value<Vec<String>>, String> {
            Ok(match project.string_option(key)? {
                Some(joined) => split_set(joined, '\n'),
                None => Value::Null,
            })
        };
        self.blacklisted_ips = split(OPTION_BLACKLISTED_IPS)?;
        self.releases = split(OPTION_RELEASES)?;
        self.error_messages = split(OPTION_ERROR_MESSAGES)?;
        Ok(())
    }

    fn fields(&self) -> [(&'static str, &Value<Vec<String>>); 3] {
        [
            (OPTION_BLACKLISTED_IPS, &self.blacklisted_ips),
            (OPTION_RELEASES, &self.releases),
            (OPTION_ERROR_MESSAGES, &self.error_messages),
        ]
    }
}

/// Security headers and source-fetching settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientSecurityModel {
    pub allowed_domains: Value<Vec<String>>,
    pub scrape_javascript: Value<bool>,
    pub security_token: Value<String>,
    pub security_token_header: Value<String>,
    pub verify_tls_ssl: Value<bool>,
}

impl ClientSecurityModel {
    fn fill(&mut self, project: &Project) {
        self.allowed_domains = Value::Known(project.allowed_domains.clone());
        self.scrape_javascript = Value::from_option(project.scrape_java_script);
        self.security_token = Value::from_option(project.security_token.clone());
        self.security_token_header = Value::known(project.security_token_header.clone().unwrap_or_default());
        self.verify_tls_ssl = Value::from_option(project.verify_ssl);
    }
}

/// State of `sentry_project`. The resource id is the project slug.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectModel {
    pub id: Value<String>,
    pub organization: Value<String>,
    pub teams: Value<Vec<String>>,
    pub name: Value<String>,
    pub slug: Value<String>,
    pub platform: Value<String>,
    pub default_rules: Value<bool>,
    pub default_key: Value<bool>,
    pub internal_id: Value<String>,
    pub features: Value<Vec<String>>,
    pub digests_min_delay: Value<i64>,
    pub digests_max_delay: Value<i64>,
    pub resolve_age: Value<i64>,
    pub filters: Value<ProjectFiltersModel>,
    pub fingerprinting_rules: Value<TrimmedString>,
    pub grouping_enhancements: Value<TrimmedString>,
    pub client_security: Value<ClientSecurityModel>,
    pub highlight_tags: Value<Vec<String>>,
}

/// The plan value when it should be sent: known, and different from the
/// prior state if there is one.
fn changed<T: Clone + PartialEq>(plan: &Value<T>, state: Option<&Value<T>>) -> Option<T> {
    match state {
        Some(state) if !plan.differs_from(state) => None,
        _ => plan.to_option(),
    }
}

impl ProjectModel {
    pub fn fill(&mut self, organization: &str, project: &Project) -> std::result::Result<(), String> {
        self.id = Value::known(project.slug.as_str());
        self.organization = Value::known(project.organization_slug().unwrap_or(organization));
        self.teams = Value::Known(project.team_slugs());
        self.name = Value::known(project.name.as_str());
        self.slug = Value::known(project.slug.as_str());
        self.platform = non_empty(project.platform.clone());
        self.internal_id = Value::known(project.id.as_str());
        self.features = Value::Known(project.features.clone());
        self.digests_min_delay = Value::from_option(project.digests_min_delay);
        self.digests_max_delay = Value::from_option(project.digests_max_delay);
        self.resolve_age = Value::from_option(project.resolve_age);

        let mut filters = ProjectFiltersModel::default();
        filters.fill(project)?;
        self.filters = Value::Known(filters);

        let fingerprinting = TrimmedString::new(project.fingerprinting_rules.clone().unwrap_or_default());
        self.fingerprinting_rules = Value::Known(preserve_trimmed(&self.fingerprinting_rules, fingerprinting));
        let grouping = TrimmedString::new(project.grouping_enhancements.clone().unwrap_or_default());
        self.grouping_enhancements = Value::Known(preserve_trimmed(&self.grouping_enhancements, grouping));

        let mut client_security = ClientSecurityModel::default();
        client_security.fill(project);
        self.client_security = Value::Known(client_security);

        self.highlight_tags = Value::Known(project.highlight_tags.clone());
        Ok(())
    }

    fn create_request(&self) -> CreateProjectRequest {
        CreateProjectRequest {
            name: self.name.to_option().unwrap_or_default(),
            slug: self.slug.to_option(),
            platform: self.platform.to_option(),
            default_rules: self.default_rules.to_option(),
        }
    }

    /// Settings to PUT. With a prior state only the changed ones are sent.
    fn update_request(&self, state: Option<&ProjectModel>) -> UpdateProjectRequest {
        let mut request = UpdateProjectRequest {
            name: changed(&self.name, state.map(|s| &s.name)),
            slug: changed(&self.slug, state.map(|s| &s.slug)),
            platform: changed(&self.platform, state.map(|s| &s.platform)),
            digests_min_delay: changed(&self.digests_min_delay, state.map(|s| &s.digests_min_delay)),
            digests_max_delay: changed(&self.digests_max_delay, state.map(|s| &s.digests_max_delay)),
            resolve_age: changed(&self.resolve_age, state.map(|s| &s.resolve_age)),
            fingerprinting_rules: changed(&self.fingerprinting_rules, state.map(|s| &s.fingerprinting_rules))
                .map(TrimmedString::into_string),
            grouping_enhancements: changed(&self.grouping_enhancements, state.map(|s| &s.grouping_enhancements))
                .map(TrimmedString::into_string),
            highlight_tags: changed(&self.highlight_tags, state.map(|s| &s.highlight_tags)),
            ..Default::default()
        };

        if !self.filters.is_unknown() {
            let plan_filters = self.filters.as_known().cloned().unwrap_or_default();
            let state_filters = state.and_then(|s| s.filters.as_known()).cloned();
            let mut options = Map::new();
            for (i, (key, value)) in plan_filters.fields().into_iter().enumerate() {
                let prior = state_filters.as_ref().map(|f| f.fields()[i].1);
                if value.is_unknown() || prior.is_some_and(|prior| prior == value) {
                    continue;
                }
                let joined = value.as_known().map(|items| join_set(items, "\n")).unwrap_or_default();
                options.insert(key.to_string(), Json::String(joined));
            }
            if !options.is_empty() {
                request.options = Some(options);
            }
        }

        if let Some(plan) = self.client_security.as_known() {
            let prior = state.and_then(|s| s.client_security.as_known());
            request.allowed_domains = changed(&plan.allowed_domains, prior.map(|p| &p.allowed_domains));
            request.scrape_java_script = changed(&plan.scrape_javascript, prior.map(|p| &p.scrape_javascript));
            request.security_token = changed(&plan.security_token, prior.map(|p| &p.security_token));
            request.security_token_header =
                changed(&plan.security_token_header, prior.map(|p| &p.security_token_header));
            request.verify_ssl = changed(&plan.verify_tls_ssl, prior.map(|p| &p.verify_tls_ssl));
        }

        request
    }
}

pub struct ProjectResource {
    client: SentryClient,
}

impl ProjectResource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }

    /// Delete the key the Service created alongside the project.
    async fn remove_default_key(&self, scope: &ProjectScope) -> Result<()> {
        let keys = ClientKey::list_all(&self.client, &ClientKeyListQuery::from(scope.clone())).await?;
        let Some(key) = keys.into_iter().find(|k| k.name == DEFAULT_KEY_NAME) else {
            return Ok(());
        };
        let id = ClientKeyId {
            scope: scope.clone(),
            key_id: key.id,
        };
        match delete_client_key(&self.client, &id).await {
            Err(err) if err.is_not_found() => Ok(()),
            other => other,
        }
    }

    /// GET the project and fill `model` from it.
    async fn refresh(&self, mut model: ProjectModel, scope: ProjectScope) -> Outcome<ProjectModel> {
        let organization = scope.organization.clone();
        let Some(project) = try_outcome!(found(Project::get(&self.client, scope).await, "read")) else {
            return Outcome::remove().with_diagnostic(not_found("project"));
        };
        try_outcome!(model.fill(&organization, &project).map_err(fill_error));
        Outcome::set(model)
    }
}

#[async_trait]
impl Resource for ProjectResource {
    type Model = ProjectModel;

    const TYPE_NAME: &'static str = "project";

    fn schema() -> Schema {
        let string_set = || AttributeType::set(AttributeType::String);
        Schema::v0()
            .with_attribute("id", Attribute::id())
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "teams",
                Attribute::required(string_set()).with_description("The slugs of the teams to create the project for."),
            )
            .with_attribute("name", Attribute::required_string().with_description("The name for the project."))
            .with_attribute(
                "slug",
                Attribute::optional_computed(AttributeType::String)
                    .with_state_for_unknown()
                    .with_description("The optional slug for this project."),
            )
            .with_attribute(
                "platform",
                Attribute::optional_string().with_description("The platform for this project."),
            )
            .with_attribute(
                "default_rules",
                Attribute::optional(AttributeType::Bool)
                    .with_state_for_unknown()
                    .with_description("Whether to create a default issue alert."),
            )
            .with_attribute(
                "default_key",
                Attribute::optional(AttributeType::Bool)
                    .with_state_for_unknown()
                    .with_description("Whether to keep the key created with the project. Only used on create."),
            )
            .with_attribute("internal_id", Attribute::computed_string().with_state_for_unknown())
            .with_attribute("features", Attribute::computed(string_set()).with_state_for_unknown())
            .with_attribute("digests_min_delay", Attribute::optional_computed(AttributeType::Int64))
            .with_attribute("digests_max_delay", Attribute::optional_computed(AttributeType::Int64))
            .with_attribute(
                "resolve_age",
                Attribute::optional_computed(AttributeType::Int64)
                    .with_description("Hours after which an unseen issue is resolved."),
            )
            .with_attribute(
                "filters",
                Attribute::optional_computed(AttributeType::object([
                    ("blacklisted_ips", Attribute::optional_computed(string_set())),
                    ("releases", Attribute::optional_computed(string_set())),
                    ("error_messages", Attribute::optional_computed(string_set())),
                ]))
                .with_state_for_unknown(),
            )
            .with_attribute("fingerprinting_rules", Attribute::optional_computed(AttributeType::String))
            .with_attribute("grouping_enhancements", Attribute::optional_computed(AttributeType::String))
            .with_attribute(
                "client_security",
                Attribute::optional_computed(AttributeType::object([
                    ("allowed_domains", Attribute::optional_computed(string_set())),
                    ("scrape_javascript", Attribute::optional_computed(AttributeType::Bool)),
                    ("security_token", Attribute::optional_computed(AttributeType::String)),
                    ("security_token_header", Attribute::optional_computed(AttributeType::String)),
                    ("verify_tls_ssl", Attribute::optional_computed(AttributeType::Bool)),
                ]))
                .with_state_for_unknown(),
            )
            .with_attribute("highlight_tags", Attribute::optional_computed(string_set()))
    }

    fn validate(model: &ProjectModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validation::size_at_least(&mut diags, "teams", &model.teams, 1);
        if let Some(filters) = model.filters.as_known() {
            validation::size_at_least(&mut diags, "filters.blacklisted_ips", &filters.blacklisted_ips, 1);
            validation::size_at_least(&mut diags, "filters.releases", &filters.releases, 1);
            validation::size_at_least(&mut diags, "filters.error_messages", &filters.error_messages, 1);
        }
        if let Some(security) = model.client_security.as_known() {
            validation::size_at_least(&mut diags, "client_security.allowed_domains", &security.allowed_domains, 1);
            validation::length_between(
                &mut diags,
                "client_security.security_token_header",
                &security.security_token_header,
                0,
                20,
            );
        }
        diags
    }

    async fn create(&self, plan: ProjectModel) -> Outcome<ProjectModel> {
        try_outcome!(checked::<Self>(&plan));
        let organization = try_outcome!(known_str(&plan.organization, "organization")).to_string();
        let teams = plan.teams.as_known().cloned().unwrap_or_default();
        let Some((first_team, other_teams)) = teams.split_first() else {
            return Outcome::failed(client_error("create", "At least one team is required"));
        };

        let created = try_outcome!(create_project(&self.client, &organization, first_team, &plan.create_request())
            .await
            .map_err(api_error("create")));
        tracing::info!(organization = %organization, slug = %created.slug, "created project");

        let scope = ProjectScope::new(&organization, &created.slug);
        let Some(updated) = try_outcome!(found(
            update_project(&self.client, &scope, &plan.update_request(None)).await,
            "update"
        )) else {
            return Outcome::remove().with_diagnostic(not_found("project"));
        };
        let scope = ProjectScope::new(&organization, &updated.slug);

        if plan.default_key == Value::Known(false) {
            try_outcome!(self
                .remove_default_key(&scope)
                .await
                .map_err(api_error("remove default key")));
        }

        for team in other_teams {
            try_outcome!(add_project_team(&self.client, &scope, team)
                .await
                .map_err(api_error("add team to project")));
        }

        self.refresh(plan, scope).await
    }

    async fn read(&self, mut state: ProjectModel) -> Outcome<ProjectModel> {
        let organization = try_outcome!(known_str(&state.organization, "organization")).to_string();
        let slug = try_outcome!(known_str(&state.id, "id")).to_string();
        let Some(project) = try_outcome!(found(
            Project::get(&self.client, ProjectScope::new(&organization, slug)).await,
            "read"
        )) else {
            return Outcome::remove();
        };
        try_outcome!(state.fill(&organization, &project).map_err(fill_error));
        Outcome::set(state)
    }

    async fn update(&self, plan: ProjectModel, state: ProjectModel) -> Outcome<ProjectModel> {
        try_outcome!(checked::<Self>(&plan));
        let organization = try_outcome!(known_str(&plan.organization, "organization")).to_string();
        let slug = try_outcome!(known_str(&state.id, "id")).to_string();
        let mut scope = ProjectScope::new(&organization, slug);

        let request = plan.update_request(Some(&state));
        if !request.is_empty() {
            let Some(updated) = try_outcome!(found(
                update_project(&self.client, &scope, &request).await,
                "update"
            )) else {
                return Outcome::remove().with_diagnostic(not_found("project"));
            };
            scope = ProjectScope::new(&organization, updated.slug);
        }

        if plan.teams.differs_from(&state.teams) {
            let planned = plan.teams.as_known().cloned().unwrap_or_default();
            let current = state.teams.as_known().cloned().unwrap_or_default();
            for team in planned.iter().filter(|t| !current.contains(t)) {
                try_outcome!(add_project_team(&self.client, &scope, team)
                    .await
                    .map_err(api_error("add team to project")));
            }
            for team in current.iter().filter(|t| !planned.contains(t)) {
                try_outcome!(remove_project_team(&self.client, &scope, team)
                    .await
                    .map_err(api_error("remove team from project")));
            }
        }

        self.refresh(plan, scope).await
    }

    async fn delete(&self, state: ProjectModel) -> Outcome<ProjectModel> {
        let organization = try_outcome!(known_str(&state.organization, "organization"));
        let slug = try_outcome!(known_str(&state.id, "id"));
        let scope = ProjectScope::new(organization, slug);
        try_outcome!(gone(delete_project(&self.client, &scope).await, "delete"));
        Outcome::remove()
    }

    async fn import_state(&self, id: &str) -> Outcome<ProjectModel> {
        let (organization, slug) =
            try_outcome!(split_two_part_id(id, "organization", "project-slug").map_err(import_error));
        Outcome::set(ProjectModel {
            id: Value::Known(slug),
            organization: Value::Known(organization),
            ..Default::default()
        })
    }
}
