use async_trait::async_trait;

use super::{api_error, checked, found, gone, known_str, Outcome, Resource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::diagnostics::{fill_error, import_error, Diagnostic, Diagnostics};
use crate::id::{build_id, split_three_part_id};
use crate::models::{list_inbound_filters, update_inbound_filter, FilterState, InboundFilterRequest, ProjectScope};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::validation;

/// State of `sentry_project_inbound_data_filter`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectInboundDataFilterModel {
    pub id: Value<String>,
    pub organization: Value<String>,
    pub project: Value<String>,
    pub filter_id: Value<String>,
    pub active: Value<bool>,
    pub subfilters: Value<Vec<String>>,
}

impl ProjectInboundDataFilterModel {
    fn target(&self) -> Result<(ProjectScope, String), Diagnostic> {
        let organization = known_str(&self.organization, "organization")?;
        let project = known_str(&self.project, "project")?;
        let filter_id = known_str(&self.filter_id, "filter_id")?;
        Ok((ProjectScope::new(organization, project), filter_id.to_string()))
    }

    fn fill_id(&mut self, scope: &ProjectScope, filter_id: &str) {
        self.id = Value::known(build_id(&[&scope.organization, &scope.project, filter_id]));
    }

    fn fill_state(&mut self, state: FilterState) {
        match state {
            FilterState::Active(active) => self.active = Value::Known(active),
            FilterState::Subfilters(subfilters) => self.subfilters = Value::Known(subfilters),
        }
    }

    /// Subfilters win when both are somehow set; validation rejects that.
    fn to_request(&self) -> InboundFilterRequest {
        match self.subfilters.as_known() {
            Some(subfilters) => InboundFilterRequest {
                active: None,
                subfilters: Some(subfilters.clone()),
            },
            None => InboundFilterRequest {
                active: self.active.to_option(),
                subfilters: None,
            },
        }
    }
}

pub struct ProjectInboundDataFilterResource {
    client: SentryClient,
}

impl ProjectInboundDataFilterResource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }

    async fn write(
        &self,
        mut plan: ProjectInboundDataFilterModel,
        action: &'static str,
    ) -> Outcome<ProjectInboundDataFilterModel> {
        let (scope, filter_id) = try_outcome!(plan.target());
        try_outcome!(update_inbound_filter(&self.client, &scope, &filter_id, &plan.to_request())
            .await
            .map_err(api_error(action)));
        plan.fill_id(&scope, &filter_id);
        Outcome::set(plan)
    }
}

#[async_trait]
impl Resource for ProjectInboundDataFilterResource {
    type Model = ProjectInboundDataFilterModel;

    const TYPE_NAME: &'static str = "project_inbound_data_filter";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::id())
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "project",
                Attribute::required_string().with_description("The slug of the project to create the filter for."),
            )
            .with_attribute(
                "filter_id",
                Attribute::required_string()
                    .with_requires_replace()
                    .with_description("The type of filter toggle to update."),
            )
            .with_attribute(
                "active",
                Attribute::optional(AttributeType::Bool).with_description(
                    "Toggle the browser-extensions, localhost, filtered-transaction, or web-crawlers filter on or off.",
                ),
            )
            .with_attribute(
                "subfilters",
                Attribute::optional(AttributeType::list(AttributeType::String))
                    .with_description("Which legacy browser filters should be active. Anything excluded is disabled."),
            )
    }

    fn validate(model: &ProjectInboundDataFilterModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validation::conflicting(
            &mut diags,
            &[
                ("active", !model.active.is_null()),
                ("subfilters", !model.subfilters.is_null()),
            ],
        );
        diags
    }

    async fn create(&self, plan: ProjectInboundDataFilterModel) -> Outcome<ProjectInboundDataFilterModel> {
        try_outcome!(checked::<Self>(&plan));
        self.write(plan, "create").await
    }

    async fn read(&self, mut state: ProjectInboundDataFilterModel) -> Outcome<ProjectInboundDataFilterModel> {
        let (scope, filter_id) = try_outcome!(state.target());
        let Some(filters) = try_outcome!(found(list_inbound_filters(&self.client, &scope).await, "read")) else {
            return Outcome::remove();
        };
        let Some(filter) = filters.into_iter().find(|f| f.id == filter_id) else {
            return Outcome::remove();
        };
        let filter_state = try_outcome!(filter.state().map_err(fill_error));
        state.fill_id(&scope, &filter_id);
        state.fill_state(filter_state);
        Outcome::set(state)
    }

    async fn update(
        &self,
        plan: ProjectInboundDataFilterModel,
        _state: ProjectInboundDataFilterModel,
    ) -> Outcome<ProjectInboundDataFilterModel> {
        try_outcome!(checked::<Self>(&plan));
        self.write(plan, "update").await
    }

    async fn delete(&self, state: ProjectInboundDataFilterModel) -> Outcome<ProjectInboundDataFilterModel> {
        let (scope, filter_id) = try_outcome!(state.target());
        let request = InboundFilterRequest {
            active: Some(false),
            subfilters: None,
        };
        try_outcome!(gone(
            update_inbound_filter(&self.client, &scope, &filter_id, &request).await,
            "delete"
        ));
        Outcome::remove()
    }

    async fn import_state(&self, id: &str) -> Outcome<ProjectInboundDataFilterModel> {
        let (organization, project, filter_id) = try_outcome!(split_three_part_id(
            id,
            "organization",
            "project-slug",
            "filter-id"
        )
        .map_err(import_error));
        Outcome::set(ProjectInboundDataFilterModel {
            id: Value::known(id),
            organization: Value::Known(organization),
            project: Value::Known(project),
            filter_id: Value::Known(filter_id),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_prefers_subfilters() {
        let model = ProjectInboundDataFilterModel {
            subfilters: Value::Known(vec!["ie_pre_9".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(model.to_request()).unwrap(),
            json!({"subfilters": ["ie_pre_9"]})
        );

        let model = ProjectInboundDataFilterModel {
            active: Value::Known(true),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(model.to_request()).unwrap(), json!({"active": true}));
    }

    #[test]
    fn test_fill_state_leaves_other_side_alone() {
        let mut model = ProjectInboundDataFilterModel::default();
        model.fill_state(FilterState::Subfilters(vec!["safari_pre_6".to_string()]));
        assert_eq!(model.active, Value::Null);
        assert_eq!(model.subfilters, Value::Known(vec!["safari_pre_6".to_string()]));
    }

    #[test]
    fn test_active_and_subfilters_conflict() {
        let model = ProjectInboundDataFilterModel {
            active: Value::Known(true),
            subfilters: Value::Known(vec![]),
            ..Default::default()
        };
        let diags = ProjectInboundDataFilterResource::validate(&model);
        assert!(diags.has_error());

        let model = ProjectInboundDataFilterModel {
            active: Value::Known(true),
            ..Default::default()
        };
        assert!(!ProjectInboundDataFilterResource::validate(&model).has_error());
    }
}
