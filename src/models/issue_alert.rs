//! Issue alert rule model.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::ProjectScope;
use crate::client::{seg, SentryClient};
use crate::error::Result;
use crate::traits::Get;

/// An issue alert rule as returned by the Service.
///
/// Conditions, filters and actions stay as raw JSON elements here; the
/// [`codec`](crate::codec) turns them into typed variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRule {
    #[serde(deserialize_with = "super::string_or_number")]
    pub id: String,

    pub name: String,

    /// Project slugs. The Service always reports exactly one.
    #[serde(default)]
    pub projects: Vec<String>,

    pub action_match: String,

    #[serde(default)]
    pub filter_match: Option<String>,

    pub frequency: i64,

    #[serde(default)]
    pub environment: Option<String>,

    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub conditions: Vec<Json>,

    #[serde(default)]
    pub filters: Vec<Json>,

    #[serde(default)]
    pub actions: Vec<Json>,

    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
}

/// Body for creating or updating an issue alert rule.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRuleRequest {
    pub name: String,

    pub action_match: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_match: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<i64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_with::rust::double_option"
    )]
    pub environment: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_with::rust::double_option"
    )]
    pub owner: Option<Option<String>>,

    pub projects: Vec<String>,

    pub conditions: Vec<Json>,

    pub filters: Vec<Json>,

    pub actions: Vec<Json>,
}

/// Locates one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRuleId {
    pub scope: ProjectScope,
    pub rule_id: String,
}

impl ProjectRuleId {
    fn path(&self) -> String {
        self.scope.path(&format!("rules/{}/", seg(&self.rule_id)))
    }
}

#[async_trait]
impl Get for ProjectRule {
    type Id = ProjectRuleId;

    #[tracing::instrument(skip(client))]
    async fn get(client: &SentryClient, id: ProjectRuleId) -> Result<Self> {
        let response = client.get(&id.path()).await?;
        SentryClient::json(response).await
    }
}

#[tracing::instrument(skip(client, request))]
pub async fn create_project_rule(
    client: &SentryClient,
    scope: &ProjectScope,
    request: &ProjectRuleRequest,
) -> Result<ProjectRule> {
    let response = client.post(&scope.path("rules/"), request).await?;
    SentryClient::json(response).await
}

#[tracing::instrument(skip(client, request))]
pub async fn update_project_rule(
    client: &SentryClient,
    id: &ProjectRuleId,
    request: &ProjectRuleRequest,
) -> Result<ProjectRule> {
    let response = client.put(&id.path(), request).await?;
    SentryClient::json(response).await
}

#[tracing::instrument(skip(client))]
pub async fn delete_project_rule(client: &SentryClient, id: &ProjectRuleId) -> Result<()> {
    client.delete(&id.path()).await?;
    Ok(())
}
