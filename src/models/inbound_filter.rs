//! Project inbound data filter model.
//!
//! A filter is either switched on and off as a whole (`active` is a bool)
//! or made of named subfilters (`active` is the list of enabled ones, as
//! with `legacy-browsers`).

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::ProjectScope;
use crate::client::{seg, SentryClient};
use crate::error::{Result, SentryError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundFilter {
    pub id: String,

    /// A bool, or the list of enabled subfilters.
    #[serde(default)]
    pub active: Json,
}

/// Decoded [`InboundFilter::active`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterState {
    Active(bool),
    Subfilters(Vec<String>),
}

impl InboundFilter {
    pub fn state(&self) -> Result<FilterState> {
        match &self.active {
            Json::Bool(b) => Ok(FilterState::Active(*b)),
            Json::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        SentryError::codec(format!("invalid subfilter for {}: {item}", self.id))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(FilterState::Subfilters),
            other => Err(SentryError::codec(format!(
                "invalid active value for {}: {other}",
                self.id
            ))),
        }
    }
}

/// Body for changing a filter. Exactly one field is sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InboundFilterRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subfilters: Option<Vec<String>>,
}

/// All filters of a project. The endpoint is not paginated.
#[tracing::instrument(skip(client))]
pub async fn list_inbound_filters(client: &SentryClient, scope: &ProjectScope) -> Result<Vec<InboundFilter>> {
    let response = client.get(&scope.path("filters/")).await?;
    SentryClient::json(response).await
}

#[tracing::instrument(skip(client, request))]
pub async fn update_inbound_filter(
    client: &SentryClient,
    scope: &ProjectScope,
    filter_id: &str,
    request: &InboundFilterRequest,
) -> Result<()> {
    client
        .put(&scope.path(&format!("filters/{}/", seg(filter_id))), request)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_states() {
        let filters: Vec<InboundFilter> = serde_json::from_value(json!([
            {"id": "browser-extensions", "active": false},
            {"id": "legacy-browsers", "active": ["ie_pre_9", "safari_pre_6"]},
            {"id": "broken", "active": 3}
        ]))
        .unwrap();
        assert_eq!(filters[0].state().unwrap(), FilterState::Active(false));
        assert_eq!(
            filters[1].state().unwrap(),
            FilterState::Subfilters(vec!["ie_pre_9".to_string(), "safari_pre_6".to_string()])
        );
        assert!(filters[2].state().is_err());
    }

    #[test]
    fn test_request_sends_one_field() {
        let request = InboundFilterRequest {
            active: Some(true),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&request).unwrap(), r#"{"active":true}"#);
    }
}
