//! Client key (DSN) model.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::ProjectScope;
use crate::client::{seg, SentryClient};
use crate::error::Result;
use crate::pagination::Page;
use crate::traits::{Get, List};

/// A client key of a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientKey {
    pub id: String,

    pub name: String,

    pub public: String,

    pub secret: String,

    #[serde(deserialize_with = "super::string_or_number")]
    pub project_id: String,

    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Absent when the key is not rate limited.
    #[serde(default)]
    pub rate_limit: Option<RateLimit>,

    /// DSN variants keyed by kind (`public`, `secret`, `csp`, ...).
    #[serde(default)]
    pub dsn: BTreeMap<String, Json>,

    #[serde(default)]
    pub browser_sdk_version: String,

    #[serde(default)]
    pub dynamic_sdk_loader_options: DynamicSdkLoaderOptions,

    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub window: i64,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicSdkLoaderOptions {
    #[serde(default)]
    pub has_replay: bool,
    #[serde(default)]
    pub has_performance: bool,
    #[serde(default)]
    pub has_debug: bool,
}

impl ClientKey {
    /// The string-valued DSN variants.
    pub fn dsn_strings(&self) -> BTreeMap<String, String> {
        self.dsn
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect()
    }

    pub fn dsn_of(&self, kind: &str) -> Option<String> {
        self.dsn.get(kind).and_then(Json::as_str).map(str::to_string)
    }
}

/// Body for creating or updating a client key.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientKeyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// `Some(None)` removes the rate limit.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_with::rust::double_option"
    )]
    pub rate_limit: Option<Option<RateLimit>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_sdk_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_sdk_loader_options: Option<DynamicSdkLoaderOptions>,
}

/// Locates one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKeyId {
    pub scope: ProjectScope,
    pub key_id: String,
}

impl ClientKeyId {
    fn path(&self) -> String {
        self.scope.path(&format!("keys/{}/", seg(&self.key_id)))
    }
}

/// Listing query; `status` is `active` or `inactive`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKeyListQuery {
    pub scope: ProjectScope,
    pub status: Option<String>,
}

impl From<ProjectScope> for ClientKeyListQuery {
    fn from(scope: ProjectScope) -> Self {
        Self {
            scope,
            status: None,
        }
    }
}

#[async_trait]
impl Get for ClientKey {
    type Id = ClientKeyId;

    #[tracing::instrument(skip(client))]
    async fn get(client: &SentryClient, id: ClientKeyId) -> Result<Self> {
        let response = client.get(&id.path()).await?;
        SentryClient::json(response).await
    }
}

#[async_trait]
impl List for ClientKey {
    type Query = ClientKeyListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &SentryClient,
        query: &ClientKeyListQuery,
        cursor: Option<&str>,
    ) -> Result<Page<Self>> {
        let params: Vec<(&str, &str)> = query
            .status
            .as_deref()
            .map(|status| ("status", status))
            .into_iter()
            .collect();
        client
            .get_page(&query.scope.path("keys/"), params.as_slice(), cursor)
            .await
    }
}

#[tracing::instrument(skip(client, request))]
pub async fn create_client_key(
    client: &SentryClient,
    scope: &ProjectScope,
    request: &ClientKeyRequest,
) -> Result<ClientKey> {
    let response = client.post(&scope.path("keys/"), request).await?;
    SentryClient::json(response).await
}

#[tracing::instrument(skip(client, request))]
pub async fn update_client_key(
    client: &SentryClient,
    id: &ClientKeyId,
    request: &ClientKeyRequest,
) -> Result<ClientKey> {
    let response = client.put(&id.path(), request).await?;
    SentryClient::json(response).await
}

#[tracing::instrument(skip(client))]
pub async fn delete_client_key(client: &SentryClient, id: &ClientKeyId) -> Result<()> {
    client.delete(&id.path()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_client_key() {
        let json = r#"{
            "id": "60120449b6b1d5e45f75561e6dabd80b",
            "name": "Liked Pegasus",
            "label": "Liked Pegasus",
            "public": "60120449b6b1d5e45f75561e6dabd80b",
            "secret": "189485c3b8ccf582bf5e12c530ef8858",
            "projectId": 4505281256090153,
            "isActive": true,
            "rateLimit": {"window": 7200, "count": 1000},
            "dsn": {
                "secret": "https://a:b@o1.ingest.sentry.io/4505281256090153",
                "public": "https://a@o1.ingest.sentry.io/4505281256090153",
                "csp": "https://o1.ingest.sentry.io/api/4505281256090153/csp-report/?sentry_key=a",
                "playstation": null
            },
            "browserSdkVersion": "7.x",
            "browserSdk": {"choices": [["latest", "latest"], ["7.x", "7.x"]]},
            "dateCreated": "2023-06-21T19:50:26.036254Z",
            "dynamicSdkLoaderOptions": {"hasReplay": true, "hasPerformance": true, "hasDebug": true}
        }"#;
        let key: ClientKey = serde_json::from_str(json).unwrap();
        assert_eq!(key.project_id, "4505281256090153");
        assert_eq!(key.rate_limit, Some(RateLimit { window: 7200, count: 1000 }));
        assert!(key.dynamic_sdk_loader_options.has_debug);
        assert_eq!(key.dsn_strings().len(), 3);
        assert!(key.dsn_of("playstation").is_none());
        assert!(key.dsn_of("csp").unwrap().contains("csp-report"));
    }

    #[test]
    fn test_rate_limit_null_is_sent() {
        let request = ClientKeyRequest {
            rate_limit: Some(None),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&request).unwrap(), r#"{"rateLimit":null}"#);
        assert_eq!(serde_json::to_string(&ClientKeyRequest::default()).unwrap(), "{}");
    }
}
