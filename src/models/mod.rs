//! Sentry API wire models and the endpoints that produce them.

mod client_key;
mod inbound_filter;
mod integration;
mod issue_alert;
mod member;
mod monitor;
mod notification_action;
mod organization;
mod ownership;
mod project;
mod repository;
mod spike_protection;
mod symbol_source;
mod team;

pub use client_key::*;
pub use inbound_filter::*;
pub use integration::*;
pub use issue_alert::*;
pub use member::*;
pub use monitor::*;
pub use notification_action::*;
pub use organization::*;
pub use ownership::*;
pub use project::*;
pub use repository::*;
pub use spike_protection::*;
pub use symbol_source::*;
pub use team::*;

use serde::{Deserialize, Deserializer};
use serde_json::Value as Json;

use crate::client::seg;

/// Locates a project within an organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectScope {
    pub organization: String,
    pub project: String,
}

impl ProjectScope {
    pub fn new(organization: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            project: project.into(),
        }
    }

    /// `0/projects/{org}/{project}/` followed by `suffix`.
    pub(crate) fn path(&self, suffix: &str) -> String {
        format!(
            "0/projects/{}/{}/{suffix}",
            seg(&self.organization),
            seg(&self.project)
        )
    }
}

/// Query for list endpoints that take no filters.
pub(crate) const NO_QUERY: &[(&str, &str)] = &[];

/// `0/organizations/{org}/` followed by `suffix`.
pub(crate) fn org_path(organization: &str, suffix: &str) -> String {
    format!("0/organizations/{}/{suffix}", seg(organization))
}

/// Ids that some endpoints send as numbers and others as strings.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Json::deserialize(deserializer)? {
        Json::String(s) => Ok(s),
        Json::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

/// Optional variant of [`string_or_number`]; null is `None`.
pub(crate) fn opt_string_or_number<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Json::deserialize(deserializer)? {
        Json::Null => Ok(None),
        Json::String(s) => Ok(Some(s)),
        Json::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "opt_string_or_number")]
        other: Option<String>,
    }

    #[test]
    fn test_string_or_number() {
        let h: Holder = serde_json::from_str(r#"{"id": 42, "other": null}"#).unwrap();
        assert_eq!(h.id, "42");
        assert_eq!(h.other, None);

        let h: Holder = serde_json::from_str(r#"{"id": "42", "other": 7}"#).unwrap();
        assert_eq!(h.id, "42");
        assert_eq!(h.other.as_deref(), Some("7"));

        assert!(serde_json::from_str::<Holder>(r#"{"id": true}"#).is_err());
    }

    #[test]
    fn test_scope_paths() {
        let scope = ProjectScope::new("my-org", "web");
        assert_eq!(scope.path("keys/"), "0/projects/my-org/web/keys/");
        assert_eq!(org_path("my-org", "members/"), "0/organizations/my-org/members/");
    }
}
