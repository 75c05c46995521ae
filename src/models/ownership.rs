//! Project ownership rules model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ProjectScope;
use crate::client::SentryClient;
use crate::error::Result;
use crate::traits::Get;

pub const AUTO_ASSIGN_ISSUE_OWNER: &str = "Auto Assign to Issue Owner";
pub const AUTO_ASSIGN_SUSPECT_COMMITS: &str = "Auto Assign to Suspect Commits";
pub const AUTO_ASSIGN_OFF: &str = "Turn off Auto-Assignment";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOwnership {
    /// The rules document. Null until rules were written once.
    #[serde(default)]
    pub raw: Option<String>,

    pub fallthrough: bool,

    pub auto_assignment: String,

    /// Null on projects that never synced; the Service treats that as on.
    #[serde(default)]
    pub codeowners_auto_sync: Option<bool>,

    #[serde(default)]
    pub is_active: bool,
}

/// Body for replacing the ownership configuration.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOwnershipRequest {
    pub raw: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallthrough: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_assignment: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub codeowners_auto_sync: Option<bool>,
}

impl ProjectOwnershipRequest {
    /// The configuration of a project nobody configured.
    pub fn defaults() -> Self {
        Self {
            raw: String::new(),
            fallthrough: Some(true),
            auto_assignment: Some(AUTO_ASSIGN_ISSUE_OWNER.to_string()),
            codeowners_auto_sync: Some(true),
        }
    }
}

#[async_trait]
impl Get for ProjectOwnership {
    type Id = ProjectScope;

    #[tracing::instrument(skip(client))]
    async fn get(client: &SentryClient, scope: ProjectScope) -> Result<Self> {
        let response = client.get(&scope.path("ownership/")).await?;
        SentryClient::json(response).await
    }
}

#[tracing::instrument(skip(client, request))]
pub async fn update_project_ownership(
    client: &SentryClient,
    scope: &ProjectScope,
    request: &ProjectOwnershipRequest,
) -> Result<ProjectOwnership> {
    let response = client.put(&scope.path("ownership/"), request).await?;
    SentryClient::json(response).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_ownership() {
        let ownership: ProjectOwnership = serde_json::from_value(json!({
            "raw": "path:src/views/checkout jane.smith@org.com",
            "fallthrough": false,
            "dateCreated": "2023-10-03T20:25:18.539823Z",
            "lastUpdated": "2023-10-03T22:49:12.294741Z",
            "isActive": true,
            "autoAssignment": "Auto Assign to Suspect Commits",
            "codeownersAutoSync": null,
            "schema": {"$version": 1, "rules": []}
        }))
        .unwrap();
        assert_eq!(ownership.auto_assignment, AUTO_ASSIGN_SUSPECT_COMMITS);
        assert_eq!(ownership.codeowners_auto_sync, None);
        assert!(!ownership.fallthrough);
    }

    #[test]
    fn test_default_request() {
        let body = serde_json::to_value(ProjectOwnershipRequest::defaults()).unwrap();
        assert_eq!(
            body,
            json!({
                "raw": "",
                "fallthrough": true,
                "autoAssignment": "Auto Assign to Issue Owner",
                "codeownersAutoSync": true
            })
        );
    }
}
