//! Project model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use super::{org_path, Organization, ProjectScope};
use crate::client::{seg, SentryClient};
use crate::error::Result;
use crate::pagination::Page;
use crate::traits::{Get, List};

/// Option keys holding the inbound filter lists, newline-joined.
pub const OPTION_BLACKLISTED_IPS: &str = "filters:blacklisted_ips";
pub const OPTION_RELEASES: &str = "filters:releases";
pub const OPTION_ERROR_MESSAGES: &str = "filters:error_messages";

/// A Sentry project.
///
/// Both the project detail endpoint and the organization-wide listing
/// return this shape; the listing omits most of the settings, so every
/// setting is optional here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Numeric id, as a string.
    #[serde(deserialize_with = "super::string_or_number")]
    pub id: String,

    pub slug: String,

    pub name: String,

    #[serde(default)]
    pub platform: Option<String>,

    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,

    #[serde(default)]
    pub features: Vec<String>,

    /// Teams the project belongs to.
    #[serde(default)]
    pub teams: Vec<ProjectTeam>,

    /// Owning organization. Present on detail responses and listings.
    #[serde(default)]
    pub organization: Option<Organization>,

    #[serde(default)]
    pub digests_min_delay: Option<i64>,

    #[serde(default)]
    pub digests_max_delay: Option<i64>,

    #[serde(default)]
    pub resolve_age: Option<i64>,

    /// Free-form project options, including the inbound filter lists.
    #[serde(default)]
    pub options: Option<Map<String, Json>>,

    #[serde(default)]
    pub fingerprinting_rules: Option<String>,

    #[serde(default)]
    pub grouping_enhancements: Option<String>,

    #[serde(default)]
    pub allowed_domains: Vec<String>,

    #[serde(default)]
    pub scrape_java_script: Option<bool>,

    #[serde(default)]
    pub security_token: Option<String>,

    #[serde(default)]
    pub security_token_header: Option<String>,

    #[serde(rename = "verifySSL", default)]
    pub verify_ssl: Option<bool>,

    #[serde(default)]
    pub highlight_tags: Vec<String>,

    #[serde(default)]
    pub color: Option<String>,

    #[serde(default)]
    pub is_public: Option<bool>,

    /// `active`, `pending_deletion`, ... Only on listings.
    #[serde(default)]
    pub status: Option<String>,
}

/// A team reference embedded in a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTeam {
    #[serde(deserialize_with = "super::string_or_number")]
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub name: String,
}

impl Project {
    /// Slugs of the teams the project belongs to.
    pub fn team_slugs(&self) -> Vec<String> {
        self.teams.iter().map(|t| t.slug.clone()).collect()
    }

    /// Slug of the owning organization, if the response carried it.
    pub fn organization_slug(&self) -> Option<&str> {
        self.organization.as_ref().map(|o| o.slug.as_str())
    }

    /// A string-valued option. `Ok(None)` when the option is absent.
    ///
    /// # Errors
    ///
    /// Fails when the option holds something other than a string.
    pub fn string_option(&self, key: &str) -> std::result::Result<Option<&str>, String> {
        match self.options.as_ref().and_then(|o| o.get(key)) {
            None | Some(Json::Null) => Ok(None),
            Some(Json::String(s)) => Ok(Some(s)),
            Some(other) => Err(format!("invalid type for {key}: {other}")),
        }
    }
}

/// Body for creating a project under a team.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateProjectRequest {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_rules: Option<bool>,
}

/// Body for updating a project. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub digests_min_delay: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub digests_max_delay: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_age: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Json>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprinting_rules: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouping_enhancements: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_domains: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrape_java_script: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_token_header: Option<String>,

    #[serde(rename = "verifySSL", skip_serializing_if = "Option::is_none")]
    pub verify_ssl: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_tags: Option<Vec<String>>,
}

impl UpdateProjectRequest {
    /// Whether nothing would be changed.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[async_trait]
impl Get for Project {
    type Id = ProjectScope;

    #[tracing::instrument(skip(client))]
    async fn get(client: &SentryClient, scope: ProjectScope) -> Result<Self> {
        let response = client.get(&scope.path("")).await?;
        SentryClient::json(response).await
    }
}

/// Option reporting whether spike protection is off for a project.
pub const OPTION_SPIKE_PROTECTION_DISABLED: &str = "quotas:spike-protection-disabled";

/// Query for project listings.
///
/// Without an organization every project the token can see is listed;
/// with one, only that organization's projects, optionally carrying the
/// named project `options`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectListQuery {
    pub organization: Option<String>,
    pub options: Option<String>,
}

impl ProjectListQuery {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    pub fn organization(organization: impl Into<String>) -> Self {
        Self {
            organization: Some(organization.into()),
            options: None,
        }
    }

    #[must_use]
    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.options = Some(option.into());
        self
    }
}

#[async_trait]
impl List for Project {
    type Query = ProjectListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &SentryClient,
        query: &ProjectListQuery,
        cursor: Option<&str>,
    ) -> Result<Page<Self>> {
        let path = match &query.organization {
            Some(organization) => org_path(organization, "projects/"),
            None => "0/projects/".to_string(),
        };
        let params: Vec<(&str, &str)> = query
            .options
            .as_deref()
            .map(|option| ("options", option))
            .into_iter()
            .collect();
        client.get_page(&path, params.as_slice(), cursor).await
    }
}

impl Project {
    /// Whether spike protection is on. `None` when the listing did not
    /// carry the option.
    pub fn spike_protection_enabled(&self) -> Option<bool> {
        self.options
            .as_ref()
            .and_then(|o| o.get(OPTION_SPIKE_PROTECTION_DISABLED))
            .and_then(Json::as_bool)
            .map(|disabled| !disabled)
    }
}

/// Create a project owned by `team`.
#[tracing::instrument(skip(client, request))]
pub async fn create_project(
    client: &SentryClient,
    organization: &str,
    team: &str,
    request: &CreateProjectRequest,
) -> Result<Project> {
    let path = format!("0/teams/{}/{}/projects/", seg(organization), seg(team));
    let response = client.post(&path, request).await?;
    SentryClient::json(response).await
}

/// Update a project addressed by its current slug.
#[tracing::instrument(skip(client, request))]
pub async fn update_project(
    client: &SentryClient,
    scope: &ProjectScope,
    request: &UpdateProjectRequest,
) -> Result<Project> {
    let response = client.put(&scope.path(""), request).await?;
    SentryClient::json(response).await
}

#[tracing::instrument(skip(client))]
pub async fn delete_project(client: &SentryClient, scope: &ProjectScope) -> Result<()> {
    client.delete(&scope.path("")).await?;
    Ok(())
}

/// Grant `team` access to the project.
#[tracing::instrument(skip(client))]
pub async fn add_project_team(client: &SentryClient, scope: &ProjectScope, team: &str) -> Result<Project> {
    let response = client
        .post_empty(&scope.path(&format!("teams/{}/", seg(team))))
        .await?;
    SentryClient::json(response).await
}

/// Revoke `team`'s access to the project.
#[tracing::instrument(skip(client))]
pub async fn remove_project_team(client: &SentryClient, scope: &ProjectScope, team: &str) -> Result<()> {
    client
        .delete(&scope.path(&format!("teams/{}/", seg(team))))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_project_detail() {
        let json = r#"{
            "id": "4505321021243392",
            "slug": "web",
            "name": "Web",
            "platform": "javascript",
            "dateCreated": "2023-06-06T00:52:00.395786Z",
            "features": ["alert-filters", "servicehooks"],
            "teams": [{"id": "2", "slug": "frontend", "name": "Frontend"}],
            "organization": {"id": "1", "slug": "acme", "name": "Acme"},
            "digestsMinDelay": 300,
            "digestsMaxDelay": 1800,
            "resolveAge": 0,
            "options": {
                "filters:blacklisted_ips": "127.0.0.1\n10.0.0.0/8",
                "filters:releases": "",
                "sentry:token_header": null
            },
            "fingerprintingRules": "error.type:DatabaseUnavailable -> system-down",
            "groupingEnhancements": "",
            "allowedDomains": ["*"],
            "scrapeJavaScript": true,
            "securityToken": "abc",
            "securityTokenHeader": null,
            "verifySSL": false,
            "highlightTags": ["handled", "level"]
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.team_slugs(), vec!["frontend".to_string()]);
        assert_eq!(project.organization_slug(), Some("acme"));
        assert_eq!(project.digests_min_delay, Some(300));
        assert_eq!(project.verify_ssl, Some(false));
        assert_eq!(
            project.string_option(OPTION_BLACKLISTED_IPS).unwrap(),
            Some("127.0.0.1\n10.0.0.0/8")
        );
        assert_eq!(project.string_option(OPTION_ERROR_MESSAGES).unwrap(), None);
    }

    #[test]
    fn test_string_option_wrong_type() {
        let project: Project = serde_json::from_str(
            r#"{"id": 1, "slug": "web", "name": "Web", "options": {"filters:releases": 3}}"#,
        )
        .unwrap();
        assert!(project.string_option(OPTION_RELEASES).is_err());
    }

    #[test]
    fn test_listing_entry_is_sparse() {
        let project: Project = serde_json::from_str(
            r#"{"id": "7", "slug": "api", "name": "API", "organization": {"id": "1", "slug": "acme", "name": "Acme"}}"#,
        )
        .unwrap();
        assert!(project.teams.is_empty());
        assert!(project.options.is_none());
    }

    #[test]
    fn test_spike_protection_option() {
        let project: Project = serde_json::from_str(
            r#"{"id": "7", "slug": "api", "name": "API", "options": {"quotas:spike-protection-disabled": true}}"#,
        )
        .unwrap();
        assert_eq!(project.spike_protection_enabled(), Some(false));

        let project: Project =
            serde_json::from_str(r#"{"id": "7", "slug": "api", "name": "API"}"#).unwrap();
        assert_eq!(project.spike_protection_enabled(), None);
    }

    #[test]
    fn test_update_request_is_empty() {
        assert!(UpdateProjectRequest::default().is_empty());
        let request = UpdateProjectRequest {
            verify_ssl: Some(true),
            ..Default::default()
        };
        assert!(!request.is_empty());
        assert_eq!(serde_json::to_string(&request).unwrap(), r#"{"verifySSL":true}"#);
    }
}
