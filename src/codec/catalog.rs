//! Identifiers and lookup tables for issue alert rule elements.

/// Condition identifiers.
pub mod conditions {
    pub const FIRST_SEEN_EVENT: &str =
        "sentry.rules.conditions.first_seen_event.FirstSeenEventCondition";
    pub const REGRESSION_EVENT: &str =
        "sentry.rules.conditions.regression_event.RegressionEventCondition";
    pub const REAPPEARED_EVENT: &str =
        "sentry.rules.conditions.reappeared_event.ReappearedEventCondition";
    pub const NEW_HIGH_PRIORITY_ISSUE: &str =
        "sentry.rules.conditions.high_priority_issue.NewHighPriorityIssueCondition";
    pub const EXISTING_HIGH_PRIORITY_ISSUE: &str =
        "sentry.rules.conditions.high_priority_issue.ExistingHighPriorityIssueCondition";
    pub const EVENT_FREQUENCY: &str =
        "sentry.rules.conditions.event_frequency.EventFrequencyCondition";
    pub const EVENT_UNIQUE_USER_FREQUENCY: &str =
        "sentry.rules.conditions.event_frequency.EventUniqueUserFrequencyCondition";
    pub const EVENT_FREQUENCY_PERCENT: &str =
        "sentry.rules.conditions.event_frequency.EventFrequencyPercentCondition";
}

/// Filter identifiers.
pub mod filters {
    pub const AGE_COMPARISON: &str = "sentry.rules.filters.age_comparison.AgeComparisonFilter";
    pub const ISSUE_OCCURRENCES: &str =
        "sentry.rules.filters.issue_occurrences.IssueOccurrencesFilter";
    pub const ASSIGNED_TO: &str = "sentry.rules.filters.assigned_to.AssignedToFilter";
    pub const LATEST_ADOPTED_RELEASE: &str =
        "sentry.rules.filters.latest_adopted_release_filter.LatestAdoptedReleaseFilter";
    pub const LATEST_RELEASE: &str = "sentry.rules.filters.latest_release.LatestReleaseFilter";
    pub const ISSUE_CATEGORY: &str = "sentry.rules.filters.issue_category.IssueCategoryFilter";
    pub const EVENT_ATTRIBUTE: &str =
        "sentry.rules.filters.event_attribute.EventAttributeFilter";
    pub const TAGGED_EVENT: &str = "sentry.rules.filters.tagged_event.TaggedEventFilter";
    pub const LEVEL: &str = "sentry.rules.filters.level.LevelFilter";
}

/// Action identifiers.
pub mod actions {
    pub const NOTIFY_EMAIL: &str = "sentry.mail.actions.NotifyEmailAction";
    pub const NOTIFY_EVENT: &str = "sentry.rules.actions.notify_event.NotifyEventAction";
    pub const NOTIFY_EVENT_SERVICE: &str =
        "sentry.rules.actions.notify_event_service.NotifyEventServiceAction";
    pub const NOTIFY_EVENT_SENTRY_APP: &str =
        "sentry.rules.actions.notify_event_sentry_app.NotifyEventSentryAppAction";
    pub const OPSGENIE_NOTIFY_TEAM: &str =
        "sentry.integrations.opsgenie.notify_action.OpsgenieNotifyTeamAction";
    pub const PAGER_DUTY_NOTIFY_SERVICE: &str =
        "sentry.integrations.pagerduty.notify_action.PagerDutyNotifyServiceAction";
    pub const SLACK_NOTIFY_SERVICE: &str =
        "sentry.integrations.slack.notify_action.SlackNotifyServiceAction";
    pub const MS_TEAMS_NOTIFY_SERVICE: &str =
        "sentry.integrations.msteams.notify_action.MsTeamsNotifyServiceAction";
    pub const DISCORD_NOTIFY_SERVICE: &str =
        "sentry.integrations.discord.notify_action.DiscordNotifyServiceAction";
    pub const JIRA_CREATE_TICKET: &str =
        "sentry.integrations.jira.notify_action.JiraCreateTicketAction";
    pub const JIRA_SERVER_CREATE_TICKET: &str =
        "sentry.integrations.jira_server.notify_action.JiraServerCreateTicketAction";
    pub const GITHUB_CREATE_TICKET: &str =
        "sentry.integrations.github.notify_action.GitHubCreateTicketAction";
    pub const GITHUB_ENTERPRISE_CREATE_TICKET: &str =
        "sentry.integrations.github_enterprise.notify_action.GitHubEnterpriseCreateTicketAction";
    pub const AZURE_DEVOPS_CREATE_TICKET: &str =
        "sentry.integrations.vsts.notify_action.AzureDevopsCreateTicketAction";
}

/// Event levels: name and wire id.
pub const LOG_LEVELS: &[(&str, &str)] = &[
    ("sample", "0"),
    ("debug", "10"),
    ("info", "20"),
    ("warning", "30"),
    ("error", "40"),
    ("fatal", "50"),
];

/// Issue group categories: name and wire id.
pub const ISSUE_GROUP_CATEGORIES: &[(&str, &str)] = &[
    ("Error", "1"),
    ("Performance", "2"),
    ("Profile", "3"),
    ("Cron", "4"),
    ("Replay", "5"),
    ("Feedback", "6"),
    ("Uptime", "7"),
    ("Metric_Alert", "8"),
];

/// Match operators: name and wire id.
pub const MATCH_TYPES: &[(&str, &str)] = &[
    ("CONTAINS", "co"),
    ("ENDS_WITH", "ew"),
    ("EQUAL", "eq"),
    ("GREATER_OR_EQUAL", "gte"),
    ("GREATER", "gt"),
    ("IS_SET", "is"),
    ("IS_IN", "in"),
    ("LESS_OR_EQUAL", "lte"),
    ("LESS", "lt"),
    ("NOT_CONTAINS", "nc"),
    ("NOT_ENDS_WITH", "new"),
    ("NOT_EQUAL", "ne"),
    ("NOT_SET", "ns"),
    ("NOT_STARTS_WITH", "nsw"),
    ("NOT_IN", "nin"),
    ("STARTS_WITH", "sw"),
];

/// Attributes accepted by the event attribute filter.
pub const EVENT_ATTRIBUTES: &[&str] = &[
    "message",
    "platform",
    "environment",
    "type",
    "error.handled",
    "error.unhandled",
    "error.main_thread",
    "exception.type",
    "exception.value",
    "user.id",
    "user.email",
    "user.username",
    "user.ip_address",
    "http.method",
    "http.url",
    "http.status_code",
    "sdk.name",
    "stacktrace.code",
    "stacktrace.module",
    "stacktrace.filename",
    "stacktrace.abs_path",
    "stacktrace.package",
    "unreal.crashtype",
    "app.in_foreground",
    "os.distribution_name",
    "os.distribution_version",
];

/// Wire id for a name.
#[must_use]
pub fn id_for(table: &[(&'static str, &'static str)], name: &str) -> Option<&'static str> {
    table.iter().find(|(n, _)| *n == name).map(|(_, id)| *id)
}

/// Name for a wire id.
#[must_use]
pub fn name_for(table: &[(&'static str, &'static str)], id: &str) -> Option<&'static str> {
    table.iter().find(|(_, i)| *i == id).map(|(name, _)| *name)
}

/// All names of a table, for validators and docs.
#[must_use]
pub fn names(table: &[(&'static str, &'static str)]) -> Vec<&'static str> {
    table.iter().map(|(name, _)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups() {
        assert_eq!(id_for(LOG_LEVELS, "fatal"), Some("50"));
        assert_eq!(name_for(LOG_LEVELS, "30"), Some("warning"));
        assert_eq!(id_for(ISSUE_GROUP_CATEGORIES, "Metric_Alert"), Some("8"));
        assert_eq!(name_for(MATCH_TYPES, "nsw"), Some("NOT_STARTS_WITH"));
        assert_eq!(id_for(MATCH_TYPES, "BOGUS"), None);
        assert_eq!(names(LOG_LEVELS).len(), 6);
    }

    #[test]
    fn test_tables_are_bijective() {
        for table in [LOG_LEVELS, ISSUE_GROUP_CATEGORIES, MATCH_TYPES] {
            for (name, id) in table {
                assert_eq!(name_for(table, id), Some(*name));
                assert_eq!(id_for(table, name), Some(*id));
            }
        }
    }
}
