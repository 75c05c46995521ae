//! Spike protection notification action model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as Json;

use super::org_path;
use crate::client::{seg, SentryClient};
use crate::error::Result;
use crate::traits::Get;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationAction {
    #[serde(deserialize_with = "super::string_or_number")]
    pub id: String,

    pub trigger_type: String,

    pub service_type: String,

    #[serde(default, deserialize_with = "super::opt_string_or_number")]
    pub integration_id: Option<String>,

    /// Channel id, user id or similar; may be a number.
    #[serde(default)]
    pub target_identifier: Json,

    #[serde(default)]
    pub target_display: Option<String>,

    /// Numeric project ids.
    #[serde(default)]
    pub projects: Vec<Json>,
}

impl NotificationAction {
    pub fn target_identifier(&self) -> Option<String> {
        match &self.target_identifier {
            Json::String(s) => Some(s.clone()),
            Json::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Project ids as strings.
    pub fn project_ids(&self) -> Vec<String> {
        self.projects
            .iter()
            .filter_map(|p| match p {
                Json::String(s) => Some(s.clone()),
                Json::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect()
    }
}

fn serialize_numeric<S>(value: &Option<String>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value.as_deref().map(|v| (v, v.parse::<i64>())) {
        Some((_, Ok(n))) => serializer.serialize_i64(n),
        Some((v, Err(_))) => serializer.serialize_str(v),
        None => serializer.serialize_none(),
    }
}

/// Body for creating or updating an action. Projects are given as slugs.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationActionRequest {
    pub trigger_type: String,

    pub service_type: String,

    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_numeric"
    )]
    pub integration_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_identifier: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_display: Option<String>,

    pub projects: Vec<String>,
}

fn action_path(organization: &str, action_id: &str) -> String {
    org_path(
        organization,
        &format!("notifications/actions/{}/", seg(action_id)),
    )
}

#[async_trait]
impl Get for NotificationAction {
    type Id = (String, String); // (organization, action id)

    #[tracing::instrument(skip(client))]
    async fn get(client: &SentryClient, (organization, action_id): (String, String)) -> Result<Self> {
        let response = client.get(&action_path(&organization, &action_id)).await?;
        SentryClient::json(response).await
    }
}

#[tracing::instrument(skip(client, request))]
pub async fn create_notification_action(
    client: &SentryClient,
    organization: &str,
    request: &NotificationActionRequest,
) -> Result<NotificationAction> {
    let response = client
        .post(&org_path(organization, "notifications/actions/"), request)
        .await?;
    SentryClient::json(response).await
}

#[tracing::instrument(skip(client, request))]
pub async fn update_notification_action(
    client: &SentryClient,
    organization: &str,
    action_id: &str,
    request: &NotificationActionRequest,
) -> Result<NotificationAction> {
    let response = client
        .put(&action_path(organization, action_id), request)
        .await?;
    SentryClient::json(response).await
}

#[tracing::instrument(skip(client))]
pub async fn delete_notification_action(
    client: &SentryClient,
    organization: &str,
    action_id: &str,
) -> Result<()> {
    client.delete(&action_path(organization, action_id)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_action() {
        let action: NotificationAction = serde_json::from_value(json!({
            "id": 836501735,
            "organizationId": "62848264",
            "serviceType": "slack",
            "targetDisplay": "#alerts",
            "targetIdentifier": "C0123",
            "targetType": "specific",
            "triggerType": "spike-protection",
            "projects": [4505321021243392_i64, "17"],
            "integrationId": 1004
        }))
        .unwrap();
        assert_eq!(action.id, "836501735");
        assert_eq!(action.integration_id.as_deref(), Some("1004"));
        assert_eq!(action.target_identifier().as_deref(), Some("C0123"));
        assert_eq!(action.project_ids(), vec!["4505321021243392", "17"]);
    }

    #[test]
    fn test_request_integration_id_is_numeric() {
        let request = NotificationActionRequest {
            trigger_type: "spike-protection".to_string(),
            service_type: "pagerduty".to_string(),
            integration_id: Some("1004".to_string()),
            projects: vec!["web".to_string()],
            ..Default::default()
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["integrationId"], json!(1004));
        assert_eq!(body["projects"], json!(["web"]));
        assert!(body.get("targetDisplay").is_none());
    }
}
