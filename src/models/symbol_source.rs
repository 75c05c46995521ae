//! Project symbol source model.
//!
//! Symbol sources live in one project option and are addressed with an
//! `id` query parameter rather than a path segment. Secrets (passwords,
//! keys) are accepted on write and never returned.

use serde::{Deserialize, Serialize};

use super::ProjectScope;
use crate::client::SentryClient;
use crate::error::Result;

pub const SOURCE_TYPES: &[&str] = &["appStoreConnect", "http", "gcs", "s3"];
pub const LAYOUT_TYPES: &[&str] = &["native", "symstore", "symstore_index2", "ssqp", "unified", "debuginfod"];
pub const LAYOUT_CASINGS: &[&str] = &["default", "uppercase", "lowercase"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSourceLayout {
    #[serde(rename = "type")]
    pub layout_type: String,
    pub casing: String,
}

/// A symbol source as returned by the Service, and the body sent to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub source_type: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<SymbolSourceLayout>,

    #[serde(
        rename = "appconnectIssuer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub app_connect_issuer: Option<String>,

    #[serde(
        rename = "appconnectPrivateKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub app_connect_private_key: Option<String>,

    #[serde(rename = "appId", default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

/// Sources of a project, narrowed to one id when given.
#[tracing::instrument(skip(client))]
pub async fn list_symbol_sources(
    client: &SentryClient,
    scope: &ProjectScope,
    id: Option<&str>,
) -> Result<Vec<SymbolSource>> {
    let params: Vec<(&str, &str)> = id.map(|id| ("id", id)).into_iter().collect();
    let response = client
        .get_with_query(&scope.path("symbol-sources/"), params.as_slice())
        .await?;
    SentryClient::json(response).await
}

#[tracing::instrument(skip(client, source))]
pub async fn create_symbol_source(
    client: &SentryClient,
    scope: &ProjectScope,
    source: &SymbolSource,
) -> Result<SymbolSource> {
    let response = client.post(&scope.path("symbol-sources/"), source).await?;
    SentryClient::json(response).await
}

#[tracing::instrument(skip(client, source))]
pub async fn update_symbol_source(
    client: &SentryClient,
    scope: &ProjectScope,
    id: &str,
    source: &SymbolSource,
) -> Result<SymbolSource> {
    let response = client
        .put_with_query(&scope.path("symbol-sources/"), &[("id", id)], source)
        .await?;
    SentryClient::json(response).await
}

#[tracing::instrument(skip(client))]
pub async fn delete_symbol_source(client: &SentryClient, scope: &ProjectScope, id: &str) -> Result<()> {
    client
        .delete_with_query(&scope.path("symbol-sources/"), &[("id", id)])
        .await?;
    Ok(())
}
