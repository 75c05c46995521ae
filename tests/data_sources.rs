//! Execution tests for data-source readers.
//!
//! Uses wiremock to mock the Sentry API, including multi-page listings
//! chained through the `Link` header.

use sentry_provider::{
    AllClientKeysDataModel, AllClientKeysDataSource, AllProjectsDataModel, AllProjectsDataSource, ClientKeyDataModel,
    ClientKeyDataSource, ClientKeyModel, DataSource, OrganizationIntegrationDataModel,
    OrganizationIntegrationDataSource, OrganizationMemberDataModel, OrganizationMemberDataSource, MemberDataModel,
    SentryClient, StateChange, Value,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> SentryClient {
    SentryClient::new("test-token", &server.uri()).unwrap()
}

fn next_link(server: &MockServer, listing: &str, cursor: &str) -> String {
    format!(
        "<{uri}/0/{listing}?&cursor=0:0:1>; rel=\"previous\"; results=\"false\"; cursor=\"0:0:1\", \
         <{uri}/0/{listing}?&cursor={cursor}>; rel=\"next\"; results=\"true\"; cursor=\"{cursor}\"",
        uri = server.uri()
    )
}

fn last_link(server: &MockServer, listing: &str) -> String {
    format!(
        "<{uri}/0/{listing}?&cursor=0:0:1>; rel=\"previous\"; results=\"true\"; cursor=\"0:0:1\", \
         <{uri}/0/{listing}?&cursor=0:300:0>; rel=\"next\"; results=\"false\"; cursor=\"0:300:0\"",
        uri = server.uri()
    )
}

fn project_json(id: u64, slug: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id.to_string(),
        "slug": slug,
        "name": slug.to_uppercase(),
        "platform": "python",
        "dateCreated": "2024-01-02T03:04:05Z",
        "features": ["releases"],
        "color": "#bf6e3f",
        "isPublic": false,
        "status": "active"
    })
}

// =============================================================================
// All projects
// =============================================================================

#[tokio::test]
async fn test_all_projects_drains_every_page() {
    let mock_server = MockServer::start().await;
    let listing = "organizations/acme/projects/";

    Mock::given(method("GET"))
        .and(path("/0/organizations/acme/projects/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([project_json(1, "web"), project_json(2, "api")]))
                .insert_header("link", next_link(&mock_server, listing, "0:100:0").as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/0/organizations/acme/projects/"))
        .and(query_param("cursor", "0:100:0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([project_json(3, "jobs")]))
                .insert_header("link", next_link(&mock_server, listing, "0:200:0").as_str()),
        )
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/0/organizations/acme/projects/"))
        .and(query_param("cursor", "0:200:0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([project_json(4, "mobile")]))
                .insert_header("link", last_link(&mock_server, listing).as_str()),
        )
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = AllProjectsDataModel {
        organization: Value::from("acme"),
        ..Default::default()
    };
    let outcome = AllProjectsDataSource::new(client(&mock_server)).read(config).await;

    assert!(!outcome.has_error(), "{:?}", outcome.diagnostics);
    let model = outcome.into_model().unwrap();
    let projects = model.projects.as_known().unwrap();
    let slugs: Vec<_> = projects.iter().filter_map(|p| p.slug.as_deref()).collect();
    assert_eq!(slugs, vec!["web", "api", "jobs", "mobile"]);
    assert_eq!(projects[0].organization, Value::from("acme"));
    assert_eq!(projects[0].is_public, Value::Known(false));
    assert_eq!(projects[2].internal_id, Value::from("3"));
}

#[tokio::test]
async fn test_all_projects_failed_page_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/organizations/acme/projects/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([project_json(1, "web")]))
                .insert_header(
                    "link",
                    next_link(&mock_server, "organizations/acme/projects/", "0:100:0").as_str(),
                ),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/0/organizations/acme/projects/"))
        .and(query_param("cursor", "0:100:0"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({"detail": "denied"})))
        .with_priority(1)
        .mount(&mock_server)
        .await;

    let config = AllProjectsDataModel {
        organization: Value::from("acme"),
        ..Default::default()
    };
    let outcome = AllProjectsDataSource::new(client(&mock_server)).read(config).await;

    assert!(outcome.has_error());
    assert_eq!(outcome.state, StateChange::Keep);
}

// =============================================================================
// Client keys
// =============================================================================

fn key_json(id: &str, name: &str, created: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "public": id,
        "secret": "s3cr3t",
        "projectId": 42,
        "isActive": true,
        "rateLimit": {"window": 60, "count": 100},
        "dsn": {"public": format!("https://{id}@o1.ingest.sentry.io/42")},
        "dateCreated": created
    })
}

fn key_config() -> ClientKeyDataModel {
    ClientKeyDataModel {
        first: Value::Null,
        key: ClientKeyModel {
            organization: Value::from("acme"),
            project: Value::from("web"),
            ..Default::default()
        },
    }
}

async fn mount_two_keys(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/0/projects/acme/web/keys/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            key_json("bbb", "Second", "2024-02-01T00:00:00Z"),
            key_json("aaa", "Default", "2023-01-01T00:00:00Z")
        ])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_client_key_multiple_keys_need_a_selector() {
    let mock_server = MockServer::start().await;
    mount_two_keys(&mock_server).await;

    let outcome = ClientKeyDataSource::new(client(&mock_server)).read(key_config()).await;

    assert!(outcome.has_error());
    let diagnostic = outcome.diagnostics.iter().next().unwrap();
    assert_eq!(
        diagnostic.detail.as_deref(),
        Some("Multiple keys found, please specify the key by name, id, or set the first flag to true.")
    );
}

#[tokio::test]
async fn test_client_key_first_picks_oldest() {
    let mock_server = MockServer::start().await;
    mount_two_keys(&mock_server).await;

    let config = ClientKeyDataModel {
        first: Value::Known(true),
        ..key_config()
    };
    let outcome = ClientKeyDataSource::new(client(&mock_server)).read(config).await;

    assert!(!outcome.has_error(), "{:?}", outcome.diagnostics);
    let model = outcome.into_model().unwrap();
    assert_eq!(model.key.id, Value::from("aaa"));
    assert_eq!(model.key.rate_limit_window, Value::Known(60));
}

#[tokio::test]
async fn test_client_key_by_name() {
    let mock_server = MockServer::start().await;
    mount_two_keys(&mock_server).await;

    let mut config = key_config();
    config.key.name = Value::from("Second");
    let outcome = ClientKeyDataSource::new(client(&mock_server)).read(config).await;

    assert_eq!(outcome.into_model().unwrap().key.id, Value::from("bbb"));
}

#[tokio::test]
async fn test_client_key_by_id_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/projects/acme/web/keys/zzz/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = key_config();
    config.key.id = Value::from("zzz");
    let outcome = ClientKeyDataSource::new(client(&mock_server)).read(config).await;

    assert!(outcome.has_error());
    let diagnostic = outcome.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.summary, "Not found");
}

#[tokio::test]
async fn test_all_keys_passes_status_filter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/projects/acme/web/keys/"))
        .and(query_param("status", "active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            key_json("aaa", "Default", "2023-01-01T00:00:00Z")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = AllClientKeysDataModel {
        organization: Value::from("acme"),
        project: Value::from("web"),
        filter_status: Value::from("active"),
        ..Default::default()
    };
    let outcome = AllClientKeysDataSource::new(client(&mock_server)).read(config).await;

    let keys = outcome.into_model().unwrap().keys.into_known().unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].name, Value::from("Default"));
}

#[tokio::test]
async fn test_all_keys_rejects_unknown_status() {
    let mock_server = MockServer::start().await;

    let config = AllClientKeysDataModel {
        organization: Value::from("acme"),
        project: Value::from("web"),
        filter_status: Value::from("deleted"),
        ..Default::default()
    };
    let outcome = AllClientKeysDataSource::new(client(&mock_server)).read(config).await;

    assert!(outcome.has_error());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

// =============================================================================
// Organization integrations
// =============================================================================

#[tokio::test]
async fn test_organization_integration_by_provider_and_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/organizations/acme/integrations/"))
        .and(query_param("provider_key", "pagerduty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "123", "name": "acme.pagerduty.com", "provider": {"key": "pagerduty", "name": "PagerDuty"}},
            {"id": "124", "name": "other.pagerduty.com", "provider": {"key": "pagerduty", "name": "PagerDuty"}}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = OrganizationIntegrationDataModel {
        organization: Value::from("acme"),
        provider_key: Value::from("pagerduty"),
        name: Value::from("acme.pagerduty.com"),
        ..Default::default()
    };
    let outcome = OrganizationIntegrationDataSource::new(client(&mock_server)).read(config).await;

    assert!(!outcome.has_error(), "{:?}", outcome.diagnostics);
    let model = outcome.into_model().unwrap();
    assert_eq!(model.id, Value::from("123"));
    assert_eq!(model.internal_id, Value::from("123"));
}

#[tokio::test]
async fn test_organization_integration_no_match() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/organizations/acme/integrations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let config = OrganizationIntegrationDataModel {
        organization: Value::from("acme"),
        provider_key: Value::from("slack"),
        name: Value::from("acme"),
        ..Default::default()
    };
    let outcome = OrganizationIntegrationDataSource::new(client(&mock_server)).read(config).await;

    let diagnostic = outcome.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.summary, "Not found");
    assert_eq!(
        diagnostic.detail.as_deref(),
        Some("No matching organization integrations found")
    );
}

// =============================================================================
// Organization members
// =============================================================================

#[tokio::test]
async fn test_organization_member_by_email() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/organizations/acme/members/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "1", "email": "owner@acme.test", "role": "owner", "orgRole": "owner"},
            {"id": "2", "email": "dev@acme.test", "role": "member"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = OrganizationMemberDataModel {
        organization: Value::from("acme"),
        member: MemberDataModel {
            email: Value::from("dev@acme.test"),
            ..Default::default()
        },
    };
    let outcome = OrganizationMemberDataSource::new(client(&mock_server)).read(config).await;

    let model = outcome.into_model().unwrap();
    assert_eq!(model.member.id, Value::from("2"));
    assert_eq!(model.member.role, Value::from("member"));
}
