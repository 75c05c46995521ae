//! Cron monitor model.
//!
//! Monitors are created through the organization endpoint and then
//! addressed through their project.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::{org_path, ProjectScope};
use crate::client::{seg, SentryClient};
use crate::error::Result;
use crate::traits::Get;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    #[serde(deserialize_with = "super::string_or_number")]
    pub id: String,

    pub slug: String,

    pub name: String,

    /// `active` or `disabled`.
    #[serde(default)]
    pub status: String,

    pub project: MonitorProject,

    #[serde(default)]
    pub owner: Option<MonitorOwner>,

    pub config: MonitorConfig,

    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorProject {
    pub slug: String,
}

/// Actor owning a monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorOwner {
    #[serde(deserialize_with = "super::string_or_number")]
    pub id: String,

    /// `user` or `team`.
    #[serde(rename = "type")]
    pub owner_type: String,
}

impl MonitorOwner {
    /// `"<type>:<id>"`, or `None` when either part is empty.
    pub fn to_actor(&self) -> Option<String> {
        if self.id.is_empty() || self.owner_type.is_empty() {
            None
        } else {
            Some(format!("{}:{}", self.owner_type, self.id))
        }
    }
}

/// Monitor configuration. The Service uses snake_case keys here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub schedule_type: Option<String>,

    /// A crontab string or an `[n, "unit"]` pair.
    #[serde(default)]
    pub schedule: Json,

    #[serde(default)]
    pub checkin_margin: Option<i64>,

    #[serde(default)]
    pub max_runtime: Option<i64>,

    #[serde(default)]
    pub timezone: Option<String>,

    #[serde(default)]
    pub failure_issue_threshold: Option<i64>,

    #[serde(default)]
    pub recovery_threshold: Option<i64>,
}

/// Body for creating or updating a monitor.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonitorRequest {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Project slug.
    pub project: String,

    /// `"<type>:<id>"`; `Some(None)` clears the owner.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_with::rust::double_option"
    )]
    pub owner: Option<Option<String>>,

    pub config: MonitorConfigRequest,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MonitorConfigRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Json>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_margin: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_runtime: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_issue_threshold: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_threshold: Option<i64>,
}

/// Locates one monitor through its project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorId {
    pub scope: ProjectScope,
    /// Monitor id or slug.
    pub monitor: String,
}

impl MonitorId {
    fn path(&self) -> String {
        self.scope.path(&format!("monitors/{}/", seg(&self.monitor)))
    }
}

#[async_trait]
impl Get for Monitor {
    type Id = MonitorId;

    #[tracing::instrument(skip(client))]
    async fn get(client: &SentryClient, id: MonitorId) -> Result<Self> {
        let response = client.get(&id.path()).await?;
        SentryClient::json(response).await
    }
}

#[tracing::instrument(skip(client, request))]
pub async fn create_monitor(
    client: &SentryClient,
    organization: &str,
    request: &MonitorRequest,
) -> Result<Monitor> {
    let response = client
        .post(&org_path(organization, "monitors/"), request)
        .await?;
    SentryClient::json(response).await
}

#[tracing::instrument(skip(client, request))]
pub async fn update_monitor(
    client: &SentryClient,
    id: &MonitorId,
    request: &MonitorRequest,
) -> Result<Monitor> {
    let response = client.put(&id.path(), request).await?;
    SentryClient::json(response).await
}

/// Schedule a monitor for deletion. The Service answers 202.
#[tracing::instrument(skip(client))]
pub async fn delete_monitor(client: &SentryClient, id: &MonitorId) -> Result<()> {
    client.delete(&id.path()).await?;
    Ok(())
}
