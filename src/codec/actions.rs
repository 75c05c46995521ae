//! Issue alert actions.

use serde_json::Value as Json;

use super::catalog::actions as ids;
use super::{exactly_one, Element, ElementBuilder, Named};
use crate::attr::Value;
use crate::error::{Result, SentryError};
use crate::types::{from_comma_string, to_comma_string};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyEmail {
    pub name: Value<String>,
    pub target_type: Value<String>,
    pub target_identifier: Value<String>,
    pub fallthrough_type: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyEventService {
    pub name: Value<String>,
    pub service: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyEventSentryApp {
    pub name: Value<String>,
    pub sentry_app_installation_uuid: Value<String>,
    /// Free-form app settings, passed through untouched.
    pub settings: Value<Json>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpsgenieNotifyTeam {
    pub name: Value<String>,
    pub account: Value<String>,
    pub team: Value<String>,
    pub priority: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagerDutyNotifyService {
    pub name: Value<String>,
    pub account: Value<String>,
    pub service: Value<String>,
    pub severity: Value<String>,
}

/// Slack message. `tags` travels comma-joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlackNotifyService {
    pub name: Value<String>,
    pub workspace: Value<String>,
    pub channel: Value<String>,
    pub channel_id: Value<String>,
    pub tags: Value<Vec<String>>,
    pub notes: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MsTeamsNotifyService {
    pub name: Value<String>,
    pub team: Value<String>,
    pub channel: Value<String>,
}

/// Discord message. `tags` travels comma-joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscordNotifyService {
    pub name: Value<String>,
    pub server: Value<String>,
    pub channel_id: Value<String>,
    pub tags: Value<Vec<String>>,
}

/// Jira and Jira Server tickets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JiraCreateTicket {
    pub name: Value<String>,
    pub integration: Value<String>,
    pub project: Value<String>,
    pub issue_type: Value<String>,
}

/// GitHub and GitHub Enterprise issues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitHubCreateTicket {
    pub name: Value<String>,
    pub integration: Value<String>,
    pub repo: Value<String>,
    pub assignee: Value<String>,
    pub labels: Value<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AzureDevOpsCreateTicket {
    pub name: Value<String>,
    pub integration: Value<String>,
    pub project: Value<String>,
    pub work_item_type: Value<String>,
}

/// One action; exactly one field must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Action {
    pub notify_email: Option<NotifyEmail>,
    pub notify_event: Option<Named>,
    pub notify_event_service: Option<NotifyEventService>,
    pub notify_event_sentry_app: Option<NotifyEventSentryApp>,
    pub opsgenie_notify_team: Option<OpsgenieNotifyTeam>,
    pub pagerduty_notify_service: Option<PagerDutyNotifyService>,
    pub slack_notify_service: Option<SlackNotifyService>,
    pub msteams_notify_service: Option<MsTeamsNotifyService>,
    pub discord_notify_service: Option<DiscordNotifyService>,
    pub jira_create_ticket: Option<JiraCreateTicket>,
    pub jira_server_create_ticket: Option<JiraCreateTicket>,
    pub github_create_ticket: Option<GitHubCreateTicket>,
    pub github_enterprise_create_ticket: Option<GitHubCreateTicket>,
    pub azure_devops_create_ticket: Option<AzureDevOpsCreateTicket>,
}

fn tags(value: &Value<Vec<String>>) -> Value<String> {
    match value {
        Value::Known(items) if !items.is_empty() => Value::Known(to_comma_string(items)),
        _ => Value::Null,
    }
}

fn read_tags(e: &Element<'_>) -> Value<Vec<String>> {
    match e.opt_str("tags") {
        Value::Known(joined) => from_comma_string(&joined),
        _ => Value::Null,
    }
}

fn labels(value: &Value<Vec<String>>) -> Value<Json> {
    value.as_ref().map(|items| {
        Json::Array(items.iter().cloned().map(Json::String).collect())
    })
}

fn read_labels(e: &Element<'_>) -> Value<Vec<String>> {
    match e.opt_json("labels") {
        Value::Known(Json::Array(items)) if !items.is_empty() => Value::Known(
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
        ),
        _ => Value::Null,
    }
}

impl JiraCreateTicket {
    fn to_api(&self, id: &str) -> Json {
        ElementBuilder::new(id)
            .str("name", &self.name)
            .str("integration", &self.integration)
            .str("project", &self.project)
            .str("issuetype", &self.issue_type)
            .build()
    }

    fn from_api(e: &Element<'_>) -> Result<Self> {
        Ok(Self {
            name: e.opt_str("name"),
            integration: e.req_str("integration")?,
            project: e.req_str("project")?,
            issue_type: e.req_str("issuetype")?,
        })
    }
}

impl GitHubCreateTicket {
    fn to_api(&self, id: &str) -> Json {
        ElementBuilder::new(id)
            .str("name", &self.name)
            .str("integration", &self.integration)
            .str("repo", &self.repo)
            .str("assignee", &self.assignee)
            .json("labels", &labels(&self.labels))
            .build()
    }

    fn from_api(e: &Element<'_>) -> Result<Self> {
        Ok(Self {
            name: e.opt_str("name"),
            integration: e.req_str("integration")?,
            repo: e.req_str("repo")?,
            assignee: e.opt_non_empty_str("assignee"),
            labels: read_labels(e),
        })
    }
}

impl Action {
    /// Encode to the wire element.
    ///
    /// # Errors
    ///
    /// Returns `Exactly one action must be set` unless exactly one variant is
    /// populated.
    pub fn to_api(&self) -> Result<Json> {
        let mut encoded: Vec<Result<Json>> = Vec::new();
        let mut push = |json: Json| encoded.push(Ok(json));

        if let Some(a) = &self.notify_email {
            push(
                ElementBuilder::new(ids::NOTIFY_EMAIL)
                    .str("name", &a.name)
                    .str("targetType", &a.target_type)
                    .str("targetIdentifier", &a.target_identifier)
                    .str("fallthroughType", &a.fallthrough_type)
                    .build(),
            );
        }
        if let Some(a) = &self.notify_event {
            push(a.to_api(ids::NOTIFY_EVENT));
        }
        if let Some(a) = &self.notify_event_service {
            push(
                ElementBuilder::new(ids::NOTIFY_EVENT_SERVICE)
                    .str("name", &a.name)
                    .str("service", &a.service)
                    .build(),
            );
        }
        if let Some(a) = &self.notify_event_sentry_app {
            push(
                ElementBuilder::new(ids::NOTIFY_EVENT_SENTRY_APP)
                    .str("name", &a.name)
                    .str("sentryAppInstallationUuid", &a.sentry_app_installation_uuid)
                    .json("settings", &a.settings)
                    .build(),
            );
        }
        if let Some(a) = &self.opsgenie_notify_team {
            push(
                ElementBuilder::new(ids::OPSGENIE_NOTIFY_TEAM)
                    .str("name", &a.name)
                    .str("account", &a.account)
                    .str("team", &a.team)
                    .str("priority", &a.priority)
                    .build(),
            );
        }
        if let Some(a) = &self.pagerduty_notify_service {
            push(
                ElementBuilder::new(ids::PAGER_DUTY_NOTIFY_SERVICE)
                    .str("name", &a.name)
                    .str("account", &a.account)
                    .str("service", &a.service)
                    .str("severity", &a.severity)
                    .build(),
            );
        }
        if let Some(a) = &self.slack_notify_service {
            push(
                ElementBuilder::new(ids::SLACK_NOTIFY_SERVICE)
                    .str("name", &a.name)
                    .str("workspace", &a.workspace)
                    .str("channel", &a.channel)
                    .str("channel_id", &a.channel_id)
                    .str("tags", &tags(&a.tags))
                    .str("notes", &a.notes)
                    .build(),
            );
        }
        if let Some(a) = &self.msteams_notify_service {
            push(
                ElementBuilder::new(ids::MS_TEAMS_NOTIFY_SERVICE)
                    .str("name", &a.name)
                    .str("team", &a.team)
                    .str("channel", &a.channel)
                    .build(),
            );
        }
        if let Some(a) = &self.discord_notify_service {
            push(
                ElementBuilder::new(ids::DISCORD_NOTIFY_SERVICE)
                    .str("name", &a.name)
                    .str("server", &a.server)
                    .str("channel_id", &a.channel_id)
                    .str("tags", &tags(&a.tags))
                    .build(),
            );
        }
        if let Some(a) = &self.jira_create_ticket {
            push(a.to_api(ids::JIRA_CREATE_TICKET));
        }
        if let Some(a) = &self.jira_server_create_ticket {
            push(a.to_api(ids::JIRA_SERVER_CREATE_TICKET));
        }
        if let Some(a) = &self.github_create_ticket {
            push(a.to_api(ids::GITHUB_CREATE_TICKET));
        }
        if let Some(a) = &self.github_enterprise_create_ticket {
            push(a.to_api(ids::GITHUB_ENTERPRISE_CREATE_TICKET));
        }
        if let Some(a) = &self.azure_devops_create_ticket {
            push(
                ElementBuilder::new(ids::AZURE_DEVOPS_CREATE_TICKET)
                    .str("name", &a.name)
                    .str("integration", &a.integration)
                    .str("project", &a.project)
                    .str("work_item_type", &a.work_item_type)
                    .build(),
            );
        }

        exactly_one(encoded, "action")
    }

    /// Decode a wire element, dispatching on its `id`.
    ///
    /// # Errors
    ///
    /// Fails on unknown ids and on elements missing required fields.
    pub fn from_api(value: &Json) -> Result<Self> {
        let e = Element::parse(value, "action")?;
        let mut action = Self::default();
        match e.id() {
            ids::NOTIFY_EMAIL => {
                action.notify_email = Some(NotifyEmail {
                    name: e.opt_str("name"),
                    target_type: e.req_str("targetType")?,
                    target_identifier: e.opt_non_empty_str("targetIdentifier"),
                    fallthrough_type: e.opt_str("fallthroughType"),
                });
            }
            ids::NOTIFY_EVENT => action.notify_event = Some(Named::from_api(&e)),
            ids::NOTIFY_EVENT_SERVICE => {
                action.notify_event_service = Some(NotifyEventService {
                    name: e.opt_str("name"),
                    service: e.req_str("service")?,
                });
            }
            ids::NOTIFY_EVENT_SENTRY_APP => {
                action.notify_event_sentry_app = Some(NotifyEventSentryApp {
                    name: e.opt_str("name"),
                    sentry_app_installation_uuid: e.req_str("sentryAppInstallationUuid")?,
                    settings: e.opt_json("settings"),
                });
            }
            ids::OPSGENIE_NOTIFY_TEAM => {
                action.opsgenie_notify_team = Some(OpsgenieNotifyTeam {
                    name: e.opt_str("name"),
                    account: e.req_str("account")?,
                    team: e.req_str("team")?,
                    priority: e.opt_str("priority"),
                });
            }
            ids::PAGER_DUTY_NOTIFY_SERVICE => {
                action.pagerduty_notify_service = Some(PagerDutyNotifyService {
                    name: e.opt_str("name"),
                    account: e.req_str("account")?,
                    service: e.req_str("service")?,
                    severity: e.opt_str("severity"),
                });
            }
            ids::SLACK_NOTIFY_SERVICE => {
                action.slack_notify_service = Some(SlackNotifyService {
                    name: e.opt_str("name"),
                    workspace: e.req_str("workspace")?,
                    channel: e.req_str("channel")?,
                    channel_id: e.opt_non_empty_str("channel_id"),
                    tags: read_tags(&e),
                    notes: e.opt_non_empty_str("notes"),
                });
            }
            ids::MS_TEAMS_NOTIFY_SERVICE => {
                action.msteams_notify_service = Some(MsTeamsNotifyService {
                    name: e.opt_str("name"),
                    team: e.req_str("team")?,
                    channel: e.req_str("channel")?,
                });
            }
            ids::DISCORD_NOTIFY_SERVICE => {
                action.discord_notify_service = Some(DiscordNotifyService {
                    name: e.opt_str("name"),
                    server: e.req_str("server")?,
                    channel_id: e.req_str("channel_id")?,
                    tags: read_tags(&e),
                });
            }
            ids::JIRA_CREATE_TICKET => {
                action.jira_create_ticket = Some(JiraCreateTicket::from_api(&e)?);
            }
            ids::JIRA_SERVER_CREATE_TICKET => {
                action.jira_server_create_ticket = Some(JiraCreateTicket::from_api(&e)?);
            }
            ids::GITHUB_CREATE_TICKET => {
                action.github_create_ticket = Some(GitHubCreateTicket::from_api(&e)?);
            }
            ids::GITHUB_ENTERPRISE_CREATE_TICKET => {
                action.github_enterprise_create_ticket = Some(GitHubCreateTicket::from_api(&e)?);
            }
            ids::AZURE_DEVOPS_CREATE_TICKET => {
                action.azure_devops_create_ticket = Some(AzureDevOpsCreateTicket {
                    name: e.opt_str("name"),
                    integration: e.req_str("integration")?,
                    project: e.req_str("project")?,
                    work_item_type: e.req_str("work_item_type")?,
                });
            }
            other => {
                return Err(SentryError::codec(format!(
                    "Unsupported action type \"{other}\""
                )))
            }
        }
        Ok(action)
    }
}
