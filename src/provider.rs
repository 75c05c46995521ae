//! Provider surface: configuration, the health check and the catalog of
//! resource and data-source type names.

use reqwest::StatusCode;

use crate::client::SentryClient;
use crate::config::ProviderConfig;
use crate::data_sources;
use crate::diagnostics::{client_error, Diagnostic};
use crate::resources;
use crate::schema::{Attribute, Schema};
use crate::transport::user_agent_string;

/// Prefix of every type name.
pub const PROVIDER_NAME: &str = "sentry";

const HEALTH_CHECK_FAILED: &str = "Failed to perform health check";

/// Schema of the provider block.
pub fn schema() -> Schema {
    Schema::v0()
        .with_attribute(
            "token",
            Attribute::optional_string()
                .sensitive()
                .with_description("The authentication token used to connect to Sentry. Falls back to `SENTRY_AUTH_TOKEN`."),
        )
        .with_attribute(
            "base_url",
            Attribute::optional_string().with_description(
                "The target Sentry Base API URL, e.g. `https://sentry.example.com/api/`. Falls back to `SENTRY_BASE_URL`.",
            ),
        )
}

/// Map the status of `GET 0/` to a diagnostic.
pub fn health_check_status(status: StatusCode) -> Result<(), Diagnostic> {
    let detail = match status {
        StatusCode::OK => return Ok(()),
        StatusCode::NOT_FOUND => "Sentry API is not available, please check the base URL".to_string(),
        StatusCode::UNAUTHORIZED => "Sentry API is not available, please check the authentication token".to_string(),
        other => format!("Sentry API returned an unexpected status: {}", other.as_u16()),
    };
    Err(Diagnostic::error(HEALTH_CHECK_FAILED).with_detail(detail))
}

/// Build the shared client and make sure the Service answers.
///
/// `host` is the name and version of the program driving the provider; it
/// ends up in the User-Agent.
pub async fn configure(config: &ProviderConfig, host: Option<(&str, &str)>) -> Result<SentryClient, Diagnostic> {
    let resolved = config
        .resolve()
        .map_err(|err| Diagnostic::error("Missing configuration").with_detail(err.to_string()))?;
    let client = SentryClient::builder(resolved.token)
        .base_url(resolved.base_url)
        .user_agent(user_agent_string(host))
        .build()
        .map_err(|err| client_error("create client", err))?;

    let response = client
        .health_check()
        .await
        .map_err(|err| Diagnostic::error(HEALTH_CHECK_FAILED).with_detail(err.to_string()))?;
    health_check_status(response.status())?;
    tracing::info!(base_url = %client.base_url(), "configured provider");
    Ok(client)
}

/// A kind without the `sentry_` prefix and how to get its schema.
type Entry = (&'static str, fn() -> Schema);

fn resource_entries() -> Vec<Entry> {
    use resources::*;
    let entries: [Entry; 17] = [
        (AllProjectsSpikeProtectionResource::TYPE_NAME, <AllProjectsSpikeProtectionResource as Resource>::schema),
        (ClientKeyResource::TYPE_NAME, <ClientKeyResource as Resource>::schema),
        (IntegrationOpsgenieResource::TYPE_NAME, <IntegrationOpsgenieResource as Resource>::schema),
        (IntegrationPagerDutyResource::TYPE_NAME, <IntegrationPagerDutyResource as Resource>::schema),
        (IssueAlertResource::TYPE_NAME, <IssueAlertResource as Resource>::schema),
        (MonitorResource::TYPE_NAME, <MonitorResource as Resource>::schema),
        (NotificationActionResource::TYPE_NAME, <NotificationActionResource as Resource>::schema),
        (OrganizationMemberResource::TYPE_NAME, <OrganizationMemberResource as Resource>::schema),
        (OrganizationRepositoryResource::TYPE_NAME, <OrganizationRepositoryResource as Resource>::schema),
        (ProjectResource::TYPE_NAME, <ProjectResource as Resource>::schema),
        (ProjectInboundDataFilterResource::TYPE_NAME, <ProjectInboundDataFilterResource as Resource>::schema),
        (ProjectMembershipResource::TYPE_NAME, <ProjectMembershipResource as Resource>::schema),
        (ProjectOwnershipResource::TYPE_NAME, <ProjectOwnershipResource as Resource>::schema),
        (ProjectSpikeProtectionResource::TYPE_NAME, <ProjectSpikeProtectionResource as Resource>::schema),
        (ProjectSymbolSourceResource::TYPE_NAME, <ProjectSymbolSourceResource as Resource>::schema),
        (TeamResource::TYPE_NAME, <TeamResource as Resource>::schema),
        (TeamMemberResource::TYPE_NAME, <TeamMemberResource as Resource>::schema),
    ];
    entries.to_vec()
}

fn data_source_entries() -> Vec<Entry> {
    use data_sources::*;
    let entries: [Entry; 10] = [
        (AllClientKeysDataSource::TYPE_NAME, <AllClientKeysDataSource as DataSource>::schema),
        (AllOrganizationMembersDataSource::TYPE_NAME, <AllOrganizationMembersDataSource as DataSource>::schema),
        (AllProjectsDataSource::TYPE_NAME, <AllProjectsDataSource as DataSource>::schema),
        (ClientKeyDataSource::TYPE_NAME, <ClientKeyDataSource as DataSource>::schema),
        (IssueAlertDataSource::TYPE_NAME, <IssueAlertDataSource as DataSource>::schema),
        (OrganizationDataSource::TYPE_NAME, <OrganizationDataSource as DataSource>::schema),
        (OrganizationIntegrationDataSource::TYPE_NAME, <OrganizationIntegrationDataSource as DataSource>::schema),
        (OrganizationMemberDataSource::TYPE_NAME, <OrganizationMemberDataSource as DataSource>::schema),
        (ProjectDataSource::TYPE_NAME, <ProjectDataSource as DataSource>::schema),
        (TeamDataSource::TYPE_NAME, <TeamDataSource as DataSource>::schema),
    ];
    entries.to_vec()
}

fn type_names(entries: Vec<Entry>) -> Vec<String> {
    let mut names: Vec<String> = entries
        .into_iter()
        .map(|(kind, _)| format!("{PROVIDER_NAME}_{kind}"))
        .collect();
    names.sort();
    names
}

fn schema_of(entries: Vec<Entry>, type_name: &str) -> Option<Schema> {
    let kind = type_name.strip_prefix(PROVIDER_NAME)?.strip_prefix('_')?;
    entries
        .into_iter()
        .find(|(name, _)| *name == kind)
        .map(|(_, schema)| schema())
}

/// Every resource type name, sorted.
pub fn resource_type_names() -> Vec<String> {
    type_names(resource_entries())
}

/// Every data-source type name, sorted.
pub fn data_source_type_names() -> Vec<String> {
    type_names(data_source_entries())
}

/// Schema of the resource called `type_name` (with the `sentry_` prefix).
pub fn resource_schema(type_name: &str) -> Option<Schema> {
    schema_of(resource_entries(), type_name)
}

/// Schema of the data source called `type_name` (with the `sentry_` prefix).
pub fn data_source_schema(type_name: &str) -> Option<Schema> {
    schema_of(data_source_entries(), type_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_names_sorted() {
        let names = resource_type_names();
        assert_eq!(names.len(), 17);
        assert_eq!(names.first().map(String::as_str), Some("sentry_all_projects_spike_protection"));
        assert!(names.contains(&"sentry_key".to_string()));
        assert!(names.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_data_source_type_names_sorted() {
        let names = data_source_type_names();
        assert_eq!(
            names,
            vec![
                "sentry_all_keys",
                "sentry_all_organization_members",
                "sentry_all_projects",
                "sentry_issue_alert",
                "sentry_key",
                "sentry_organization",
                "sentry_organization_integration",
                "sentry_organization_member",
                "sentry_project",
                "sentry_team",
            ]
        );
    }

    #[test]
    fn test_schema_lookup() {
        let schema = resource_schema("sentry_issue_alert").unwrap();
        assert_eq!(schema.version, 2);
        assert!(resource_schema("sentry_nope").is_none());
        assert!(resource_schema("issue_alert").is_none());
        assert!(data_source_schema("sentry_all_keys").is_some());
    }

    #[test]
    fn test_health_check_status() {
        assert!(health_check_status(StatusCode::OK).is_ok());
        let d = health_check_status(StatusCode::NOT_FOUND).unwrap_err();
        assert_eq!(
            d.detail.as_deref(),
            Some("Sentry API is not available, please check the base URL")
        );
        let d = health_check_status(StatusCode::UNAUTHORIZED).unwrap_err();
        assert_eq!(
            d.detail.as_deref(),
            Some("Sentry API is not available, please check the authentication token")
        );
        let d = health_check_status(StatusCode::BAD_GATEWAY).unwrap_err();
        assert_eq!(d.detail.as_deref(), Some("Sentry API returned an unexpected status: 502"));
    }
}
