use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value as Json;

use super::{api_error, checked, found, gone, known_str, Outcome, Resource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::codec::{check_raw_elements, decode_list, encode_list, Action, Condition, Filter};
use crate::diagnostics::{attribute_error, fill_error, import_error, not_found, Diagnostic, Diagnostics};
use crate::error::{Result, SentryError};
use crate::id::split_three_part_id;
use crate::models::{
    create_project_rule, delete_project_rule, update_project_rule, ProjectRule, ProjectRuleId, ProjectRuleRequest,
    ProjectScope,
};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::traits::Get;
use crate::types::{preserve, LossyJson};
use crate::validation;

pub const ACTION_MATCHES: &[&str] = &["all", "any"];
pub const FILTER_MATCHES: &[&str] = &["all", "any", "none"];

/// State of `sentry_issue_alert`.
///
/// Each of conditions, filters and actions is held either as raw JSON or
/// as a structured `*_v2` list, whichever the user configured.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueAlertModel {
    pub id: Value<String>,
    pub organization: Value<String>,
    pub project: Value<String>,
    pub name: Value<String>,
    pub action_match: Value<String>,
    pub filter_match: Value<String>,
    pub frequency: Value<i64>,
    pub environment: Value<String>,
    pub owner: Value<String>,
    pub conditions: Value<LossyJson>,
    pub filters: Value<LossyJson>,
    pub actions: Value<LossyJson>,
    pub conditions_v2: Value<Vec<Condition>>,
    pub filters_v2: Value<Vec<Filter>>,
    pub actions_v2: Value<Vec<Action>>,
}

/// Fill one element kind, keeping whichever representation is in use.
fn fill_kind<T>(
    raw: &mut Value<LossyJson>,
    structured: &mut Value<Vec<T>>,
    wire: &[Json],
    decode: impl Fn(&Json) -> Result<T>,
) -> Result<()> {
    if structured.is_null() {
        *raw = if wire.is_empty() {
            Value::Null
        } else {
            Value::Known(preserve(raw, LossyJson::from_json(&Json::Array(wire.to_vec()))))
        };
    } else {
        *structured = Value::Known(decode_list(wire, decode)?);
    }
    Ok(())
}

fn wire_kind<T>(
    raw: &Value<LossyJson>,
    structured: &Value<Vec<T>>,
    encode: impl Fn(&T) -> Result<Json>,
    attribute: &str,
) -> std::result::Result<Vec<Json>, Diagnostic> {
    let invalid = |err: SentryError| attribute_error(attribute, "Invalid attribute value", err.to_string());
    let encoded = match (raw.as_known(), structured.as_known()) {
        (Some(raw), _) => raw.to_json().map_err(invalid)?,
        (None, Some(items)) => encode_list(items, encode).map_err(invalid)?,
        (None, None) => return Ok(Vec::new()),
    };
    match encoded {
        Json::Array(items) => Ok(items),
        Json::Null => Ok(Vec::new()),
        _ => Err(attribute_error(attribute, "Invalid attribute value", "Expected a JSON array")),
    }
}

impl IssueAlertModel {
    fn target(&self) -> std::result::Result<ProjectRuleId, Diagnostic> {
        Ok(ProjectRuleId {
            scope: ProjectScope::new(
                known_str(&self.organization, "organization")?,
                known_str(&self.project, "project")?,
            ),
            rule_id: known_str(&self.id, "id")?.to_string(),
        })
    }

    /// # Errors
    ///
    /// Fails when the rule does not name exactly one project or an element
    /// cannot be decoded into the structured form.
    pub fn fill(&mut self, organization: &str, rule: &ProjectRule) -> Result<()> {
        let [project] = rule.projects.as_slice() else {
            return Err(SentryError::codec(format!(
                "Expected 1 project, got {}",
                rule.projects.len()
            )));
        };
        self.id = Value::known(rule.id.as_str());
        self.organization = Value::known(organization);
        self.project = Value::known(project.as_str());
        self.name = Value::known(rule.name.as_str());
        self.action_match = Value::known(rule.action_match.as_str());
        self.filter_match = Value::from_option(rule.filter_match.clone());
        self.frequency = Value::Known(rule.frequency);
        self.environment = Value::from_option(rule.environment.clone());
        self.owner = Value::from_option(rule.owner.clone());
        fill_kind(&mut self.conditions, &mut self.conditions_v2, &rule.conditions, Condition::from_api)?;
        fill_kind(&mut self.filters, &mut self.filters_v2, &rule.filters, Filter::from_api)?;
        fill_kind(&mut self.actions, &mut self.actions_v2, &rule.actions, Action::from_api)?;
        Ok(())
    }

    fn to_request(&self) -> std::result::Result<ProjectRuleRequest, Diagnostic> {
        Ok(ProjectRuleRequest {
            name: self.name.to_option().unwrap_or_default(),
            action_match: self.action_match.to_option().unwrap_or_default(),
            filter_match: self.filter_match.to_option(),
            frequency: self.frequency.to_option(),
            environment: self.environment.to_patch(),
            owner: self.owner.to_patch(),
            projects: self.project.to_option().into_iter().collect(),
            conditions: wire_kind(&self.conditions, &self.conditions_v2, Condition::to_api, "conditions_v2")?,
            filters: wire_kind(&self.filters, &self.filters_v2, Filter::to_api, "filters_v2")?,
            actions: wire_kind(&self.actions, &self.actions_v2, Action::to_api, "actions_v2")?,
        })
    }
}

/// State recorded under schema version 1, where elements were lists of
/// string maps and the id was `org/project/alert-id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueAlertModelV1 {
    pub id: Value<String>,
    pub organization: Value<String>,
    pub project: Value<String>,
    pub name: Value<String>,
    pub conditions: Value<Vec<BTreeMap<String, String>>>,
    pub filters: Value<Vec<BTreeMap<String, String>>>,
    pub actions: Value<Vec<BTreeMap<String, String>>>,
    pub action_match: Value<String>,
    pub filter_match: Value<String>,
    pub frequency: Value<i64>,
    pub environment: Value<String>,
    pub internal_id: Value<String>,
}

fn upgrade_elements(elements: &Value<Vec<BTreeMap<String, String>>>) -> Result<Value<LossyJson>> {
    match elements.as_known() {
        Some(items) if !items.is_empty() => Ok(Value::Known(LossyJson::from_json(&serde_json::to_value(items)?))),
        _ => Ok(Value::Null),
    }
}

/// Move a version 1 state to the current schema.
///
/// # Errors
///
/// Fails when the old id is not `org/project/alert-id`.
pub fn upgrade_state_v1(prior: &IssueAlertModelV1) -> Result<IssueAlertModel> {
    let (organization, project, alert_id) = split_three_part_id(
        prior.id.as_deref().unwrap_or_default(),
        "organization",
        "project-slug",
        "alert-id",
    )?;
    Ok(IssueAlertModel {
        id: Value::Known(alert_id),
        organization: Value::Known(organization),
        project: Value::Known(project),
        name: prior.name.clone(),
        action_match: prior.action_match.clone(),
        filter_match: prior.filter_match.clone(),
        frequency: prior.frequency.clone(),
        environment: prior.environment.clone(),
        conditions: upgrade_elements(&prior.conditions)?,
        filters: upgrade_elements(&prior.filters)?,
        actions: upgrade_elements(&prior.actions)?,
        ..Default::default()
    })
}

pub struct IssueAlertResource {
    client: SentryClient,
}

impl IssueAlertResource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

/// One variant of a structured element: its own fields plus the computed
/// display name.
fn variant(fields: &[(&'static str, AttributeType)]) -> Attribute {
    Attribute::optional(AttributeType::object(
        std::iter::once(("name", Attribute::computed_string()))
            .chain(fields.iter().map(|(key, t)| (*key, Attribute::optional(t.clone())))),
    ))
}

fn element_list(variants: Vec<(&'static str, Attribute)>) -> Attribute {
    Attribute::optional(AttributeType::list(AttributeType::object(variants)))
}

fn conditions_v2_attribute() -> Attribute {
    use AttributeType::{Float64, Int64, String as Str};
    let frequency = [
        ("comparison_type", Str),
        ("comparison_interval", Str),
        ("value", Int64),
        ("interval", Str),
    ];
    element_list(vec![
        ("first_seen_event", variant(&[])),
        ("regression_event", variant(&[])),
        ("reappeared_event", variant(&[])),
        ("new_high_priority_issue", variant(&[])),
        ("existing_high_priority_issue", variant(&[])),
        ("event_frequency", variant(&frequency)),
        ("event_unique_user_frequency", variant(&frequency)),
        (
            "event_frequency_percent",
            variant(&[
                ("comparison_type", Str),
                ("comparison_interval", Str),
                ("value", Float64),
                ("interval", Str),
            ]),
        ),
    ])
}

fn filters_v2_attribute() -> Attribute {
    use AttributeType::{Int64, String as Str};
    element_list(vec![
        (
            "age_comparison",
            variant(&[("comparison_type", Str), ("value", Int64), ("time", Str)]),
        ),
        ("issue_occurrences", variant(&[("value", Int64)])),
        ("assigned_to", variant(&[("target_type", Str), ("target_identifier", Str)])),
        (
            "latest_adopted_release",
            variant(&[("oldest_or_newest", Str), ("older_or_newer", Str), ("environment", Str)]),
        ),
        ("latest_release", variant(&[])),
        ("issue_category", variant(&[("value", Str)])),
        ("event_attribute", variant(&[("attribute", Str), ("match", Str), ("value", Str)])),
        ("tagged_event", variant(&[("key", Str), ("match", Str), ("value", Str)])),
        ("level", variant(&[("match", Str), ("level", Str)])),
    ])
}

fn actions_v2_attribute() -> Attribute {
    use AttributeType::{Json as JsonType, String as Str};
    let jira = [("integration", Str), ("project", Str), ("issue_type", Str)];
    let github = [
        ("integration", Str),
        ("repo", Str),
        ("assignee", Str),
        ("labels", AttributeType::set(Str)),
    ];
    element_list(vec![
        (
            "notify_email",
            variant(&[("target_type", Str), ("target_identifier", Str), ("fallthrough_type", Str)]),
        ),
        ("notify_event", variant(&[])),
        ("notify_event_service", variant(&[("service", Str)])),
        (
            "notify_event_sentry_app",
            variant(&[("sentry_app_installation_uuid", Str), ("settings", JsonType)]),
        ),
        (
            "opsgenie_notify_team",
            variant(&[("account", Str), ("team", Str), ("priority", Str)]),
        ),
        (
            "pagerduty_notify_service",
            variant(&[("account", Str), ("service", Str), ("severity", Str)]),
        ),
        (
            "slack_notify_service",
            variant(&[
                ("workspace", Str),
                ("channel", Str),
                ("channel_id", Str),
                ("tags", AttributeType::set(Str)),
                ("notes", Str),
            ]),
        ),
        ("msteams_notify_service", variant(&[("team", Str), ("channel", Str)])),
        (
            "discord_notify_service",
            variant(&[("server", Str), ("channel_id", Str), ("tags", AttributeType::set(Str))]),
        ),
        ("jira_create_ticket", variant(&jira)),
        ("jira_server_create_ticket", variant(&jira)),
        ("github_create_ticket", variant(&github)),
        ("github_enterprise_create_ticket", variant(&github)),
        (
            "azure_devops_create_ticket",
            variant(&[("integration", Str), ("project", Str), ("work_item_type", Str)]),
        ),
    ])
}

fn check_structured<T>(diags: &mut Diagnostics, attribute: &str, items: &Value<Vec<T>>, encode: impl Fn(&T) -> Result<Json>) {
    for (index, item) in items.as_known().into_iter().flatten().enumerate() {
        if let Err(err) = encode(item) {
            diags.push(attribute_error(
                format!("{attribute}[{index}]"),
                "Invalid attribute value",
                err.to_string(),
            ));
        }
    }
}

#[async_trait]
impl Resource for IssueAlertResource {
    type Model = IssueAlertModel;

    const TYPE_NAME: &'static str = "issue_alert";

    fn schema() -> Schema {
        let raw = |description: &str| Attribute::optional(AttributeType::Json).with_description(description);
        Schema::new(2)
            .with_attribute("id", Attribute::id())
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "project",
                Attribute::required_string().with_description("The project slug."),
            )
            .with_attribute(
                "name",
                Attribute::required_string().with_description("The issue alert name."),
            )
            .with_attribute(
                "action_match",
                Attribute::required_string()
                    .with_description("Trigger actions when `all` or `any` of the conditions are met."),
            )
            .with_attribute(
                "filter_match",
                Attribute::optional_string()
                    .with_description("Trigger actions if `all`, `any`, or `none` of the filters match."),
            )
            .with_attribute(
                "frequency",
                Attribute::optional_computed(AttributeType::Int64)
                    .with_description("Minutes between repeated actions for the same issue."),
            )
            .with_attribute("environment", Attribute::optional_string())
            .with_attribute(
                "owner",
                Attribute::optional_string().with_description("The ID of the team or user that owns the rule."),
            )
            .with_attribute("conditions", raw("List of conditions as a JSON array. Conflicts with conditions_v2."))
            .with_attribute("filters", raw("List of filters as a JSON array. Conflicts with filters_v2."))
            .with_attribute("actions", raw("List of actions as a JSON array. Conflicts with actions_v2."))
            .with_attribute("conditions_v2", conditions_v2_attribute())
            .with_attribute("filters_v2", filters_v2_attribute())
            .with_attribute("actions_v2", actions_v2_attribute())
    }

    fn validate(model: &IssueAlertModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validation::length_between(&mut diags, "name", &model.name, 1, 64);
        validation::one_of(&mut diags, "action_match", &model.action_match, ACTION_MATCHES);
        validation::one_of(&mut diags, "filter_match", &model.filter_match, FILTER_MATCHES);
        for (raw, structured, raw_set, structured_set) in [
            ("conditions", "conditions_v2", !model.conditions.is_null(), !model.conditions_v2.is_null()),
            ("filters", "filters_v2", !model.filters.is_null(), !model.filters_v2.is_null()),
            ("actions", "actions_v2", !model.actions.is_null(), !model.actions_v2.is_null()),
        ] {
            validation::conflicting(&mut diags, &[(raw, raw_set), (structured, structured_set)]);
        }
        if let Some(conditions) = model.conditions.as_known() {
            match conditions.to_json() {
                Ok(json) => {
                    for problem in check_raw_elements(&json, "condition") {
                        diags.push(attribute_error("conditions", "Invalid attribute value", problem));
                    }
                }
                Err(err) => diags.push(attribute_error("conditions", "Invalid attribute value", err.to_string())),
            }
        }
        check_structured(&mut diags, "conditions_v2", &model.conditions_v2, Condition::to_api);
        check_structured(&mut diags, "filters_v2", &model.filters_v2, Filter::to_api);
        check_structured(&mut diags, "actions_v2", &model.actions_v2, Action::to_api);
        diags
    }

    async fn create(&self, mut plan: IssueAlertModel) -> Outcome<IssueAlertModel> {
        try_outcome!(checked::<Self>(&plan));
        let organization = try_outcome!(known_str(&plan.organization, "organization")).to_string();
        let scope = ProjectScope::new(&organization, try_outcome!(known_str(&plan.project, "project")));
        let request = try_outcome!(plan.to_request());
        let rule = try_outcome!(create_project_rule(&self.client, &scope, &request)
            .await
            .map_err(api_error("create")));
        tracing::info!(project = %scope.project, rule = %rule.id, "created issue alert");
        try_outcome!(plan.fill(&organization, &rule).map_err(fill_error));
        Outcome::set(plan)
    }

    async fn read(&self, mut state: IssueAlertModel) -> Outcome<IssueAlertModel> {
        let id = try_outcome!(state.target());
        let organization = id.scope.organization.clone();
        let Some(rule) = try_outcome!(found(ProjectRule::get(&self.client, id).await, "read")) else {
            return Outcome::remove();
        };
        try_outcome!(state.fill(&organization, &rule).map_err(fill_error));
        Outcome::set(state)
    }

    async fn update(&self, mut plan: IssueAlertModel, state: IssueAlertModel) -> Outcome<IssueAlertModel> {
        try_outcome!(checked::<Self>(&plan));
        let mut id = try_outcome!(state.target());
        id.scope.project = try_outcome!(known_str(&plan.project, "project")).to_string();
        let organization = id.scope.organization.clone();
        let request = try_outcome!(plan.to_request());
        let Some(rule) = try_outcome!(found(
            update_project_rule(&self.client, &id, &request).await,
            "update"
        )) else {
            return Outcome::remove().with_diagnostic(not_found("issue alert"));
        };
        try_outcome!(plan.fill(&organization, &rule).map_err(fill_error));
        Outcome::set(plan)
    }

    async fn delete(&self, state: IssueAlertModel) -> Outcome<IssueAlertModel> {
        let id = try_outcome!(state.target());
        try_outcome!(gone(delete_project_rule(&self.client, &id).await, "delete"));
        Outcome::remove()
    }

    async fn import_state(&self, id: &str) -> Outcome<IssueAlertModel> {
        let (organization, project, alert_id) = try_outcome!(split_three_part_id(
            id,
            "organization",
            "project-slug",
            "alert-id"
        )
        .map_err(import_error));
        Outcome::set(IssueAlertModel {
            id: Value::Known(alert_id),
            organization: Value::Known(organization),
            project: Value::Known(project),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Named;
    use serde_json::json;

    const FIRST_SEEN: &str = "sentry.rules.conditions.first_seen_event.FirstSeenEventCondition";
    const NOTIFY_EVENT: &str = "sentry.rules.actions.notify_event.NotifyEventAction";

    fn rule(conditions: Json) -> ProjectRule {
        serde_json::from_value(json!({
            "id": "42",
            "name": "My Rule",
            "projects": ["web"],
            "actionMatch": "any",
            "filterMatch": "all",
            "frequency": 30,
            "environment": null,
            "owner": null,
            "conditions": conditions,
            "filters": [],
            "actions": [{"id": NOTIFY_EVENT, "name": "Send a notification (for all legacy integrations)"}]
        }))
        .unwrap()
    }

    fn raw_plan() -> IssueAlertModel {
        IssueAlertModel {
            organization: Value::from("acme"),
            project: Value::from("web"),
            name: Value::from("My Rule"),
            action_match: Value::from("any"),
            filter_match: Value::from("all"),
            frequency: Value::Known(30),
            conditions: Value::Known(LossyJson::new(format!(r#"[{{"id": "{FIRST_SEEN}"}}]"#)).unwrap()),
            actions: Value::Known(LossyJson::new(format!(r#"[{{"id":"{NOTIFY_EVENT}"}}]"#)).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn test_fill_keeps_raw_text_on_echo() {
        let mut model = raw_plan();
        let before = model.conditions.clone();
        model
            .fill("acme", &rule(json!([{"id": FIRST_SEEN, "name": "A new issue is created"}])))
            .unwrap();
        assert_eq!(model.conditions, before);
        assert_eq!(model.filters, Value::Null);
        assert_eq!(model.conditions_v2, Value::Null);
        assert_eq!(model.id, Value::from("42"));
    }

    #[test]
    fn test_fill_structured_when_configured() {
        let mut model = raw_plan();
        model.conditions = Value::Null;
        model.conditions_v2 = Value::Unknown;
        model
            .fill("acme", &rule(json!([{"id": FIRST_SEEN, "name": "A new issue is created"}])))
            .unwrap();
        let conditions = model.conditions_v2.as_known().unwrap();
        assert_eq!(
            conditions[0].first_seen_event,
            Some(Named {
                name: Value::from("A new issue is created")
            })
        );
        assert_eq!(model.conditions, Value::Null);
    }

    #[test]
    fn test_fill_rejects_multiple_projects() {
        let mut r = rule(json!([]));
        r.projects.push("api".to_string());
        let err = IssueAlertModel::default().fill("acme", &r).unwrap_err();
        assert_eq!(err.to_string(), "Expected 1 project, got 2");
    }

    #[test]
    fn test_request_from_structured_conditions() {
        let mut plan = raw_plan();
        plan.conditions = Value::Null;
        plan.conditions_v2 = Value::Known(vec![Condition {
            first_seen_event: Some(Named::default()),
            ..Default::default()
        }]);
        let body = serde_json::to_value(plan.to_request().unwrap()).unwrap();
        assert_eq!(body["conditions"], json!([{"id": FIRST_SEEN}]));
        assert_eq!(body["projects"], json!(["web"]));
        assert_eq!(body["filters"], json!([]));
        assert_eq!(body["environment"], Json::Null);
    }

    #[test]
    fn test_validate() {
        let mut plan = raw_plan();
        plan.name = Value::known("x".repeat(65));
        plan.filter_match = Value::from("some");
        plan.actions_v2 = Value::Known(vec![Action::default()]);
        plan.conditions = Value::Known(LossyJson::new(r#"[{"id": "a", "name": "computed"}]"#).unwrap());
        let diags = IssueAlertResource::validate(&plan);
        let attributes: Vec<_> = diags.iter().filter_map(|d| d.attribute.as_deref()).collect();
        assert_eq!(
            attributes,
            vec!["name", "filter_match", "actions", "conditions", "actions_v2[0]"]
        );
    }

    #[test]
    fn test_upgrade_from_v1() {
        let prior = IssueAlertModelV1 {
            id: Value::from("acme/web/42"),
            name: Value::from("My Rule"),
            conditions: Value::Known(vec![BTreeMap::from([("id".to_string(), FIRST_SEEN.to_string())])]),
            filters: Value::Known(vec![]),
            action_match: Value::from("any"),
            internal_id: Value::from("42"),
            ..Default::default()
        };
        let upgraded = upgrade_state_v1(&prior).unwrap();
        assert_eq!(upgraded.id, Value::from("42"));
        assert_eq!(upgraded.organization, Value::from("acme"));
        assert_eq!(upgraded.project, Value::from("web"));
        assert_eq!(upgraded.filters, Value::Null);
        let conditions = upgraded.conditions.as_known().unwrap().to_json().unwrap();
        assert_eq!(conditions, json!([{"id": FIRST_SEEN}]));

        let bad = IssueAlertModelV1 {
            id: Value::from("42"),
            ..Default::default()
        };
        assert!(upgrade_state_v1(&bad).is_err());
    }
}
