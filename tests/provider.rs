//! Execution tests for provider configuration.

use sentry_provider::{provider, ProviderConfig, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, token: &str) -> ProviderConfig {
    ProviderConfig {
        token: Value::from(token),
        base_url: Value::Known(format!("{}/api/", server.uri())),
    }
}

#[tokio::test]
async fn test_configure_runs_health_check() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/"))
        .and(header("authorization", "Bearer sntrys_ok"))
        .and(header("user-agent", provider_user_agent().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"version": "0"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = provider::configure(&config(&mock_server, "sntrys_ok"), Some(("terraform", "1.9.0")))
        .await
        .unwrap();

    assert_eq!(client.base_url().as_str(), format!("{}/api/", mock_server.uri()));
}

fn provider_user_agent() -> String {
    sentry_provider::transport::user_agent_string(Some(("terraform", "1.9.0")))
}

#[tokio::test]
async fn test_configure_bad_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({"detail": "Invalid token"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let diagnostic = provider::configure(&config(&mock_server, "sntrys_secret_value"), None)
        .await
        .unwrap_err();

    assert_eq!(diagnostic.summary, "Failed to perform health check");
    assert_eq!(
        diagnostic.detail.as_deref(),
        Some("Sentry API is not available, please check the authentication token")
    );
    assert!(!diagnostic.to_string().contains("sntrys_secret_value"));
}

#[tokio::test]
async fn test_configure_bad_base_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let diagnostic = provider::configure(&config(&mock_server, "sntrys_ok"), None)
        .await
        .unwrap_err();

    assert_eq!(
        diagnostic.detail.as_deref(),
        Some("Sentry API is not available, please check the base URL")
    );
}
