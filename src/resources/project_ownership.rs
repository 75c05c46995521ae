use async_trait::async_trait;

use super::{api_error, checked, found, gone, known_str, Outcome, Resource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::diagnostics::{import_error, Diagnostic, Diagnostics};
use crate::id::split_two_part_id;
use crate::models::{
    update_project_ownership, ProjectOwnership, ProjectOwnershipRequest, ProjectScope, AUTO_ASSIGN_ISSUE_OWNER,
    AUTO_ASSIGN_OFF, AUTO_ASSIGN_SUSPECT_COMMITS,
};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::traits::Get;
use crate::types::{preserve_trimmed, TrimmedString};
use crate::validation;

/// State of `sentry_project_ownership`.
///
/// Ownership always exists on a project, so create and update both
/// replace the configuration and delete puts the defaults back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectOwnershipModel {
    pub organization: Value<String>,
    pub project: Value<String>,
    pub raw: Value<TrimmedString>,
    pub fallthrough: Value<bool>,
    pub auto_assignment: Value<String>,
    pub codeowners_auto_sync: Value<bool>,
}

impl ProjectOwnershipModel {
    fn fill(&mut self, ownership: &ProjectOwnership) {
        let raw = TrimmedString::new(ownership.raw.clone().unwrap_or_default());
        self.raw = Value::Known(preserve_trimmed(&self.raw, raw));
        self.fallthrough = Value::Known(ownership.fallthrough);
        self.auto_assignment = Value::known(ownership.auto_assignment.as_str());
        // Projects that never synced report null, which the Service treats as on.
        self.codeowners_auto_sync = Value::Known(ownership.codeowners_auto_sync.unwrap_or(true));
    }

    fn to_request(&self) -> ProjectOwnershipRequest {
        ProjectOwnershipRequest {
            raw: self.raw.as_known().map(|r| r.as_str().to_string()).unwrap_or_default(),
            fallthrough: self.fallthrough.to_option(),
            auto_assignment: self.auto_assignment.to_option(),
            codeowners_auto_sync: self.codeowners_auto_sync.to_option(),
        }
    }

    fn scope(&self) -> Result<ProjectScope, Diagnostic> {
        Ok(ProjectScope::new(
            known_str(&self.organization, "organization")?,
            known_str(&self.project, "project")?,
        ))
    }
}

pub struct ProjectOwnershipResource {
    client: SentryClient,
}

impl ProjectOwnershipResource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }

    async fn write(&self, mut plan: ProjectOwnershipModel, action: &'static str) -> Outcome<ProjectOwnershipModel> {
        let scope = try_outcome!(plan.scope());
        let ownership = try_outcome!(update_project_ownership(&self.client, &scope, &plan.to_request())
            .await
            .map_err(api_error(action)));
        plan.fill(&ownership);
        Outcome::set(plan)
    }
}

#[async_trait]
impl Resource for ProjectOwnershipResource {
    type Model = ProjectOwnershipModel;

    const TYPE_NAME: &'static str = "project_ownership";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "project",
                Attribute::required_string()
                    .with_requires_replace()
                    .with_description("The slug of the project."),
            )
            .with_attribute(
                "raw",
                Attribute::required_string().with_description("Raw input for ownership configuration."),
            )
            .with_attribute(
                "fallthrough",
                Attribute::required(AttributeType::Bool)
                    .with_description("Whether to fall through to the default ownership rules."),
            )
            .with_attribute(
                "auto_assignment",
                Attribute::required_string().with_description("The auto-assignment mode."),
            )
            .with_attribute(
                "codeowners_auto_sync",
                Attribute::optional_computed(AttributeType::Bool)
                    .with_description("Whether to automatically sync codeowners."),
            )
    }

    fn validate(model: &ProjectOwnershipModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validation::one_of(
            &mut diags,
            "auto_assignment",
            &model.auto_assignment,
            &[AUTO_ASSIGN_ISSUE_OWNER, AUTO_ASSIGN_SUSPECT_COMMITS, AUTO_ASSIGN_OFF],
        );
        diags
    }

    async fn create(&self, plan: ProjectOwnershipModel) -> Outcome<ProjectOwnershipModel> {
        try_outcome!(checked::<Self>(&plan));
        self.write(plan, "create").await
    }

    async fn read(&self, mut state: ProjectOwnershipModel) -> Outcome<ProjectOwnershipModel> {
        let scope = try_outcome!(state.scope());
        let Some(ownership) = try_outcome!(found(ProjectOwnership::get(&self.client, scope).await, "read")) else {
            return Outcome::remove();
        };
        state.fill(&ownership);
        Outcome::set(state)
    }

    async fn update(&self, plan: ProjectOwnershipModel, _state: ProjectOwnershipModel) -> Outcome<ProjectOwnershipModel> {
        try_outcome!(checked::<Self>(&plan));
        self.write(plan, "update").await
    }

    async fn delete(&self, state: ProjectOwnershipModel) -> Outcome<ProjectOwnershipModel> {
        let scope = try_outcome!(state.scope());
        let reset = update_project_ownership(&self.client, &scope, &ProjectOwnershipRequest::defaults())
            .await
            .map(|_| ());
        try_outcome!(gone(reset, "delete"));
        Outcome::remove()
    }

    async fn import_state(&self, id: &str) -> Outcome<ProjectOwnershipModel> {
        let (organization, project) =
            try_outcome!(split_two_part_id(id, "organization", "project-slug").map_err(import_error));
        Outcome::set(ProjectOwnershipModel {
            organization: Value::Known(organization),
            project: Value::Known(project),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ownership(raw: &str, sync: serde_json::Value) -> ProjectOwnership {
        serde_json::from_value(json!({
            "raw": raw,
            "fallthrough": true,
            "autoAssignment": "Turn off Auto-Assignment",
            "codeownersAutoSync": sync
        }))
        .unwrap()
    }

    #[test]
    fn test_fill_keeps_trailing_newline() {
        let mut model = ProjectOwnershipModel {
            raw: Value::known("path:src/* #backend\n"),
            ..Default::default()
        };
        model.fill(&ownership("path:src/* #backend", json!(null)));
        assert_eq!(model.raw, Value::known("path:src/* #backend\n"));
        assert_eq!(model.codeowners_auto_sync, Value::Known(true));
        assert_eq!(model.auto_assignment, Value::from(AUTO_ASSIGN_OFF));
    }

    #[test]
    fn test_fill_takes_changed_rules() {
        let mut model = ProjectOwnershipModel {
            raw: Value::known("path:src/* #backend"),
            ..Default::default()
        };
        model.fill(&ownership("path:src/* #frontend", json!(false)));
        assert_eq!(model.raw, Value::known("path:src/* #frontend"));
        assert_eq!(model.codeowners_auto_sync, Value::Known(false));
    }

    #[test]
    fn test_request_omits_unknowns() {
        let model = ProjectOwnershipModel {
            raw: Value::known("*.js #frontend"),
            fallthrough: Value::Known(false),
            auto_assignment: Value::Unknown,
            codeowners_auto_sync: Value::Unknown,
            ..Default::default()
        };
        let body = serde_json::to_value(model.to_request()).unwrap();
        assert_eq!(body, json!({"raw": "*.js #frontend", "fallthrough": false}));
    }

    #[test]
    fn test_validate_auto_assignment() {
        let model = ProjectOwnershipModel {
            auto_assignment: Value::from("Always"),
            ..Default::default()
        };
        assert!(ProjectOwnershipResource::validate(&model).has_error());
    }
}
