//! Resource lifecycle handlers.
//!
//! Each resource kind is a struct holding a [`SentryClient`] and
//! implementing [`Resource`]. Handlers take the planned or prior model,
//! talk to the Service and return an [`Outcome`]: the state to record plus
//! any diagnostics. Failures never panic and never carry the auth token.

/// Return early with the error side of a `Result<_, Diagnostic>`.
macro_rules! try_outcome {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(diagnostic) => return $crate::resources::Outcome::from(diagnostic),
        }
    };
}
pub(crate) use try_outcome;

mod all_projects_spike_protection;
mod client_key;
mod integration_opsgenie;
mod integration_pagerduty;
mod integration_rows;
mod issue_alert;
mod monitor;
mod notification_action;
mod organization_member;
mod organization_repository;
mod project;
mod project_inbound_data_filter;
mod project_membership;
mod project_ownership;
mod project_spike_protection;
mod project_symbol_source;
mod team;
mod team_member;

pub use all_projects_spike_protection::*;
pub use client_key::*;
pub use integration_opsgenie::*;
pub use integration_pagerduty::*;
pub use issue_alert::*;
pub use monitor::*;
pub use notification_action::*;
pub use organization_member::*;
pub use organization_repository::*;
pub use project::*;
pub use project_inbound_data_filter::*;
pub use project_membership::*;
pub use project_ownership::*;
pub use project_spike_protection::*;
pub use project_symbol_source::*;
pub use team::*;
pub use team_member::*;

use async_trait::async_trait;

use crate::attr::Value;
use crate::diagnostics::{attribute_error, from_api_error, Diagnostic, Diagnostics};
use crate::error::{Result, SentryError};
use crate::schema::Schema;

/// What the Host should do with the stored state.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange<M> {
    /// Leave the stored state as it is.
    Keep,
    /// Replace the stored state.
    Set(M),
    /// Forget the resource.
    Remove,
}

/// Result of a lifecycle operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<M> {
    pub state: StateChange<M>,
    pub diagnostics: Diagnostics,
}

impl<M> Outcome<M> {
    pub fn set(model: M) -> Self {
        Self {
            state: StateChange::Set(model),
            diagnostics: Diagnostics::new(),
        }
    }

    #[must_use]
    pub fn remove() -> Self {
        Self {
            state: StateChange::Remove,
            diagnostics: Diagnostics::new(),
        }
    }

    #[must_use]
    pub fn keep() -> Self {
        Self {
            state: StateChange::Keep,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Leave the state alone and report `diagnostics`.
    pub fn failed(diagnostics: impl Into<Diagnostics>) -> Self {
        Self {
            state: StateChange::Keep,
            diagnostics: diagnostics.into(),
        }
    }

    #[must_use]
    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.diagnostics.has_error()
    }

    /// The new state, if one was set.
    pub fn model(&self) -> Option<&M> {
        match &self.state {
            StateChange::Set(model) => Some(model),
            _ => None,
        }
    }

    pub fn into_model(self) -> Option<M> {
        match self.state {
            StateChange::Set(model) => Some(model),
            _ => None,
        }
    }
}

impl<M> From<Diagnostic> for Outcome<M> {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::failed(diagnostic)
    }
}

impl<M> From<Diagnostics> for Outcome<M> {
    fn from(diagnostics: Diagnostics) -> Self {
        Self::failed(diagnostics)
    }
}

/// A resource kind managed through the Service.
#[async_trait]
pub trait Resource: Send + Sync {
    type Model: Clone + Send + Sync + 'static;

    /// Type name without the `sentry_` prefix.
    const TYPE_NAME: &'static str;

    fn schema() -> Schema;

    /// Check a plan before anything is sent. Unknown values pass.
    fn validate(_model: &Self::Model) -> Diagnostics {
        Diagnostics::new()
    }

    async fn create(&self, plan: Self::Model) -> Outcome<Self::Model>;

    async fn read(&self, state: Self::Model) -> Outcome<Self::Model>;

    async fn update(&self, plan: Self::Model, state: Self::Model) -> Outcome<Self::Model>;

    async fn delete(&self, state: Self::Model) -> Outcome<Self::Model>;

    /// Turn an import id into a partial state for a following read.
    async fn import_state(&self, id: &str) -> Outcome<Self::Model>;
}

/// Run `R::validate` on a plan. Errors stop the handler before any request.
pub(crate) fn checked<R: Resource>(plan: &R::Model) -> std::result::Result<(), Diagnostics> {
    let diagnostics = R::validate(plan);
    if diagnostics.has_error() {
        Err(diagnostics)
    } else {
        Ok(())
    }
}

/// Convert a Service error into a client diagnostic for `action`.
pub(crate) fn api_error(action: &'static str) -> impl Fn(SentryError) -> Diagnostic {
    move |err| from_api_error(action, &err)
}

/// `Ok(None)` on 404.
pub(crate) fn found<T>(result: Result<T>, action: &'static str) -> std::result::Result<Option<T>, Diagnostic> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(from_api_error(action, &err)),
    }
}

/// Deleting something already gone is success.
pub(crate) fn gone(result: Result<()>, action: &'static str) -> std::result::Result<(), Diagnostic> {
    found(result, action).map(|_| ())
}

/// The known value of a required attribute.
pub(crate) fn known_str<'a>(value: &'a Value<String>, attribute: &str) -> std::result::Result<&'a str, Diagnostic> {
    value.as_deref().ok_or_else(|| {
        attribute_error(
            attribute,
            "Missing attribute",
            format!("Attribute {attribute} must be known"),
        )
    })
}

/// Empty strings from the Service become null.
pub(crate) fn non_empty(value: Option<String>) -> Value<String> {
    Value::from_option(value.filter(|v| !v.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_constructors() {
        let o: Outcome<u8> = Outcome::set(1);
        assert_eq!(o.model(), Some(&1));
        assert!(!o.has_error());

        let o: Outcome<u8> = Outcome::remove();
        assert_eq!(o.state, StateChange::Remove);
        assert!(o.diagnostics.is_empty());

        let o: Outcome<u8> = crate::diagnostics::not_supported("update").into();
        assert_eq!(o.state, StateChange::Keep);
        assert!(o.has_error());
    }

    #[test]
    fn test_found_and_gone() {
        let missing: Result<()> = Err(SentryError::Api {
            status: 404,
            body: "gone".to_string(),
        });
        assert_eq!(found(missing, "read").unwrap(), None);

        let failure: Result<()> = Err(SentryError::Api {
            status: 500,
            body: "boom".to_string(),
        });
        let diagnostic = gone(failure, "delete").unwrap_err();
        assert_eq!(
            diagnostic.detail.as_deref(),
            Some("Unable to delete, got status 500: boom")
        );
    }

    #[test]
    fn test_known_str() {
        assert_eq!(known_str(&Value::from("acme"), "organization").unwrap(), "acme");
        let d = known_str(&Value::Unknown, "organization").unwrap_err();
        assert_eq!(d.attribute.as_deref(), Some("organization"));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(String::new())), Value::Null);
        assert_eq!(non_empty(Some("python".to_string())), Value::from("python"));
        assert_eq!(non_empty(None), Value::Null);
    }
}
