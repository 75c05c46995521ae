use async_trait::async_trait;

use super::{api_error, checked, found, gone, known_str, Outcome, Resource};
use crate::attr::Value;
use crate::client::SentryClient;
use crate::codec::schedule::{self, IntervalUnit, Schedule, ScheduleInterval};
use crate::diagnostics::{attribute_error, fill_error, import_error, not_found, Diagnostic, Diagnostics};
use crate::error::Result;
use crate::id::split_three_part_id;
use crate::models::{
    create_monitor, delete_monitor, update_monitor, Monitor, MonitorConfig, MonitorConfigRequest, MonitorId,
    MonitorRequest, ProjectScope,
};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::traits::Get;
use crate::validation;

pub const MONITOR_STATUSES: &[&str] = &["active", "disabled"];
pub const OWNER_TYPES: &[&str] = &["user", "team"];

/// The nested `config` object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorConfigModel {
    pub schedule_crontab: Value<String>,
    pub schedule_interval: Value<ScheduleInterval>,
    pub checkin_margin: Value<i64>,
    pub max_runtime: Value<i64>,
    pub timezone: Value<String>,
    pub failure_issue_threshold: Value<i64>,
    pub recovery_threshold: Value<i64>,
}

impl MonitorConfigModel {
    fn from_api(config: &MonitorConfig) -> Result<Self> {
        let schedule = Schedule::from_wire(config.schedule_type.as_deref(), &config.schedule)?;
        let (schedule_crontab, schedule_interval) = schedule::to_model(&schedule);
        Ok(Self {
            schedule_crontab,
            schedule_interval,
            checkin_margin: Value::from_option(config.checkin_margin),
            max_runtime: Value::from_option(config.max_runtime),
            timezone: Value::from_option(config.timezone.clone().filter(|tz| !tz.is_empty())),
            failure_issue_threshold: Value::from_option(config.failure_issue_threshold),
            recovery_threshold: Value::from_option(config.recovery_threshold),
        })
    }

    fn to_request(&self) -> std::result::Result<MonitorConfigRequest, Diagnostic> {
        let schedule = schedule::from_model(&self.schedule_crontab, &self.schedule_interval)
            .map_err(|err| attribute_error("config.schedule_interval", "Invalid schedule", err.to_string()))?
            .ok_or_else(|| {
                attribute_error(
                    "config.schedule_crontab",
                    "Invalid schedule",
                    "The schedule must be known before it can be sent",
                )
            })?;
        Ok(MonitorConfigRequest {
            schedule_type: Some(schedule.schedule_type().to_string()),
            schedule: Some(schedule.to_wire()),
            timezone: self.timezone.to_option(),
            checkin_margin: self.checkin_margin.to_option(),
            max_runtime: self.max_runtime.to_option(),
            failure_issue_threshold: self.failure_issue_threshold.to_option(),
            recovery_threshold: self.recovery_threshold.to_option(),
        })
    }

    fn validate(&self, diags: &mut Diagnostics) {
        if !self.schedule_crontab.is_unknown() && !self.schedule_interval.is_unknown() {
            if let Err(err) = schedule::from_model(&self.schedule_crontab, &self.schedule_interval) {
                diags.push(attribute_error("config", "Invalid schedule", err.to_string()));
            }
        }
        validation::not_empty(diags, "config.schedule_crontab", &self.schedule_crontab);
        if let Some(interval) = self.schedule_interval.as_known() {
            for unit in IntervalUnit::ALL {
                let value = match unit {
                    IntervalUnit::Year => &interval.year,
                    IntervalUnit::Month => &interval.month,
                    IntervalUnit::Week => &interval.week,
                    IntervalUnit::Day => &interval.day,
                    IntervalUnit::Hour => &interval.hour,
                    IntervalUnit::Minute => &interval.minute,
                };
                validation::int_at_least(diags, &format!("config.schedule_interval.{unit}"), value, 1);
            }
        }
        validation::int_between(diags, "config.checkin_margin", &self.checkin_margin, 0, 40320);
        validation::int_between(diags, "config.max_runtime", &self.max_runtime, 1, 40320);
        validation::int_between(diags, "config.failure_issue_threshold", &self.failure_issue_threshold, 1, 720);
        validation::int_between(diags, "config.recovery_threshold", &self.recovery_threshold, 1, 720);
    }
}

/// State of `sentry_monitor`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorModel {
    pub id: Value<String>,
    pub organization: Value<String>,
    pub project: Value<String>,
    pub name: Value<String>,
    pub slug: Value<String>,
    /// `"<type>:<id>"`.
    pub owner: Value<String>,
    pub config: Value<MonitorConfigModel>,
    pub status: Value<String>,
}

impl MonitorModel {
    fn scope(&self) -> std::result::Result<ProjectScope, Diagnostic> {
        Ok(ProjectScope::new(
            known_str(&self.organization, "organization")?,
            known_str(&self.project, "project")?,
        ))
    }

    pub fn fill(&mut self, organization: &str, monitor: &Monitor) -> Result<()> {
        self.config = Value::Known(MonitorConfigModel::from_api(&monitor.config)?);
        self.id = Value::known(monitor.id.as_str());
        self.organization = Value::known(organization);
        self.project = Value::known(monitor.project.slug.as_str());
        self.name = Value::known(monitor.name.as_str());
        self.slug = Value::known(monitor.slug.as_str());
        self.owner = Value::from_option(monitor.owner.as_ref().and_then(|owner| owner.to_actor()));
        self.status = Value::known(monitor.status.as_str());
        Ok(())
    }

    fn to_request(&self) -> std::result::Result<MonitorRequest, Diagnostic> {
        let config = self
            .config
            .as_known()
            .ok_or_else(|| attribute_error("config", "Missing attribute", "Attribute config must be known"))?;
        Ok(MonitorRequest {
            name: self.name.to_option().unwrap_or_default(),
            slug: self.slug.to_option().filter(|slug| !slug.is_empty()),
            project: self.project.to_option().unwrap_or_default(),
            owner: self.owner.to_patch(),
            config: config.to_request()?,
            status: self.status.to_option(),
        })
    }
}

pub struct MonitorResource {
    client: SentryClient,
}

impl MonitorResource {
    pub fn new(client: SentryClient) -> Self {
        Self { client }
    }
}

fn interval_attribute() -> Attribute {
    Attribute::optional(AttributeType::object(
        IntervalUnit::ALL.map(|unit| (unit.as_str(), Attribute::optional(AttributeType::Int64))),
    ))
    .with_description("Interval schedule. Exactly one of year, month, week, day, hour or minute must be set.")
}

#[async_trait]
impl Resource for MonitorResource {
    type Model = MonitorModel;

    const TYPE_NAME: &'static str = "monitor";

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::id())
            .with_attribute("organization", Attribute::organization())
            .with_attribute(
                "project",
                Attribute::required_string()
                    .with_requires_replace()
                    .with_state_for_unknown()
                    .with_description("The project of this resource."),
            )
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "slug",
                Attribute::optional_computed(AttributeType::String)
                    .with_state_for_unknown()
                    .with_description("Unique monitor slug. Derived from the name when omitted."),
            )
            .with_attribute(
                "owner",
                Attribute::optional_string().with_description("Owner actor in the format `user:<id>` or `team:<id>`."),
            )
            .with_attribute(
                "config",
                Attribute::required(AttributeType::object([
                    ("schedule_crontab", Attribute::optional_string()),
                    ("schedule_interval", interval_attribute()),
                    ("checkin_margin", Attribute::optional_computed(AttributeType::Int64)),
                    ("max_runtime", Attribute::optional_computed(AttributeType::Int64)),
                    ("timezone", Attribute::optional_string()),
                    ("failure_issue_threshold", Attribute::optional_computed(AttributeType::Int64)),
                    ("recovery_threshold", Attribute::optional_computed(AttributeType::Int64)),
                ])),
            )
            .with_attribute(
                "status",
                Attribute::optional_computed(AttributeType::String).with_description("Either `active` or `disabled`."),
            )
    }

    fn validate(model: &MonitorModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validation::not_empty(&mut diags, "slug", &model.slug);
        validation::one_of(&mut diags, "status", &model.status, MONITOR_STATUSES);
        if let Some(owner) = model.owner.as_deref() {
            let valid = owner
                .split_once(':')
                .is_some_and(|(kind, id)| OWNER_TYPES.contains(&kind) && !id.is_empty());
            if !valid {
                diags.push(attribute_error(
                    "owner",
                    "Invalid attribute value",
                    format!("Owner must look like user:<id> or team:<id>, got: {owner}"),
                ));
            }
        }
        if let Some(config) = model.config.as_known() {
            config.validate(&mut diags);
        }
        diags
    }

    async fn create(&self, mut plan: MonitorModel) -> Outcome<MonitorModel> {
        try_outcome!(checked::<Self>(&plan));
        let organization = try_outcome!(known_str(&plan.organization, "organization")).to_string();
        let request = try_outcome!(plan.to_request());
        let monitor = try_outcome!(create_monitor(&self.client, &organization, &request)
            .await
            .map_err(api_error("create")));
        tracing::info!(monitor = %monitor.slug, "created monitor");
        try_outcome!(plan.fill(&organization, &monitor).map_err(fill_error));
        Outcome::set(plan)
    }

    async fn read(&self, mut state: MonitorModel) -> Outcome<MonitorModel> {
        let scope = try_outcome!(state.scope());
        let monitor = try_outcome!(known_str(&state.id, "id")).to_string();
        let organization = scope.organization.clone();
        let Some(found_monitor) = try_outcome!(found(
            Monitor::get(&self.client, MonitorId { scope, monitor }).await,
            "read"
        )) else {
            return Outcome::remove();
        };
        try_outcome!(state.fill(&organization, &found_monitor).map_err(fill_error));
        Outcome::set(state)
    }

    async fn update(&self, mut plan: MonitorModel, state: MonitorModel) -> Outcome<MonitorModel> {
        try_outcome!(checked::<Self>(&plan));
        let scope = try_outcome!(state.scope());
        let monitor = try_outcome!(known_str(&state.id, "id")).to_string();
        let organization = scope.organization.clone();
        let request = try_outcome!(plan.to_request());
        let Some(updated) = try_outcome!(found(
            update_monitor(&self.client, &MonitorId { scope, monitor }, &request).await,
            "update"
        )) else {
            return Outcome::remove().with_diagnostic(not_found("monitor"));
        };
        try_outcome!(plan.fill(&organization, &updated).map_err(fill_error));
        Outcome::set(plan)
    }

    async fn delete(&self, state: MonitorModel) -> Outcome<MonitorModel> {
        let scope = try_outcome!(state.scope());
        let monitor = try_outcome!(known_str(&state.id, "id")).to_string();
        try_outcome!(gone(
            delete_monitor(&self.client, &MonitorId { scope, monitor }).await,
            "delete"
        ));
        Outcome::remove()
    }

    async fn import_state(&self, id: &str) -> Outcome<MonitorModel> {
        let (organization, project, monitor_id) = try_outcome!(split_three_part_id(
            id,
            "organization",
            "project-slug",
            "monitor-id"
        )
        .map_err(import_error));
        Outcome::set(MonitorModel {
            id: Value::Known(monitor_id),
            organization: Value::Known(organization),
            project: Value::Known(project),
            ..Default::default()
        })
    }
}
