//! Organization model.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{org_path, TeamRoleListItem};
use crate::client::SentryClient;
use crate::error::Result;
use crate::traits::Get;

/// A Sentry organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Numeric id, as a string.
    #[serde(deserialize_with = "super::string_or_number")]
    pub id: String,

    pub slug: String,

    pub name: String,

    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,

    /// Organization roles, lowest first. Only on detail responses.
    #[serde(default)]
    pub org_role_list: Vec<OrgRoleListItem>,

    /// Team roles, lowest first. Only on detail responses.
    #[serde(default)]
    pub team_role_list: Vec<TeamRoleListItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgRoleListItem {
    pub id: String,
    /// The team role every holder of this organization role gets at least.
    #[serde(default)]
    pub minimum_team_role: Option<String>,
}

#[async_trait]
impl Get for Organization {
    type Id = String; // Organization slug

    #[tracing::instrument(skip(client))]
    async fn get(client: &SentryClient, organization: String) -> Result<Self> {
        let response = client.get(&org_path(&organization, "")).await?;
        SentryClient::json(response).await
    }
}
