//! Execution tests for the request pipeline.
//!
//! Uses wiremock to stand in for the Sentry API and checks what actually
//! goes over the wire: headers, retries and the concurrency gate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sentry_provider::transport::{
    user_agent_string, ConcurrencyLimit, HttpTransport, RetryPolicy, Transport, CONCURRENT_LIMIT_HEADER,
    DEFAULT_USER_AGENT, RATE_LIMIT_RESET_HEADER,
};
use sentry_provider::{Get, Organization, SentryClient};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn organization_json() -> serde_json::Value {
    serde_json::json!({"id": "1", "slug": "acme", "name": "Acme"})
}

fn fast_retries(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        min_wait: Duration::from_millis(10),
        max_wait: Duration::from_millis(50),
    }
}

// =============================================================================
// Headers
// =============================================================================

#[tokio::test]
async fn test_bearer_token_and_user_agent_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/organizations/acme/"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(organization_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SentryClient::new("test-token", &mock_server.uri()).unwrap();
    let organization = Organization::get(&client, "acme".to_string()).await.unwrap();

    assert_eq!(organization.slug, "acme");
}

#[tokio::test]
async fn test_host_user_agent_override() {
    let mock_server = MockServer::start().await;
    let user_agent = user_agent_string(Some(("terraform", "1.9.0")));

    Mock::given(method("GET"))
        .and(path("/0/organizations/acme/"))
        .and(header("user-agent", user_agent.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(organization_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SentryClient::builder("test-token")
        .base_url(mock_server.uri())
        .user_agent(user_agent.clone())
        .build()
        .unwrap();
    Organization::get(&client, "acme".to_string()).await.unwrap();
}

// =============================================================================
// Retries
// =============================================================================

#[tokio::test]
async fn test_rate_limited_request_is_retried_after_reset() {
    let mock_server = MockServer::start().await;
    let reset = chrono::Utc::now().timestamp_millis() as f64 / 1000.0 + 0.2;

    Mock::given(method("GET"))
        .and(path("/0/organizations/acme/"))
        .respond_with(
            ResponseTemplate::new(429).insert_header(RATE_LIMIT_RESET_HEADER, format!("{reset:.3}").as_str()),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/0/organizations/acme/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(organization_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SentryClient::builder("test-token")
        .base_url(mock_server.uri())
        .retry_policy(fast_retries(2))
        .build()
        .unwrap();

    let started = Instant::now();
    let organization = Organization::get(&client, "acme".to_string()).await.unwrap();

    assert_eq!(organization.name, "Acme");
    // The reset instant wins over the much shorter backoff
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/organizations/acme/"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/0/organizations/acme/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(organization_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SentryClient::builder("test-token")
        .base_url(mock_server.uri())
        .retry_policy(fast_retries(3))
        .build()
        .unwrap();

    assert!(Organization::get(&client, "acme".to_string()).await.is_ok());
}

#[tokio::test]
async fn test_not_implemented_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/organizations/acme/"))
        .respond_with(ResponseTemplate::new(501).set_body_json(serde_json::json!({"detail": "nope"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SentryClient::builder("test-token")
        .base_url(mock_server.uri())
        .retry_policy(fast_retries(3))
        .build()
        .unwrap();

    let err = Organization::get(&client, "acme".to_string()).await.unwrap_err();
    assert_eq!(err.status(), Some(501));
    assert!(err.to_string().contains("nope"));
}

#[tokio::test]
async fn test_exhausted_retries_return_last_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/organizations/acme/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = SentryClient::builder("test-token")
        .base_url(mock_server.uri())
        .retry_policy(fast_retries(2))
        .build()
        .unwrap();

    let err = Organization::get(&client, "acme".to_string()).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/organizations/gone/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"detail": "Not found"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SentryClient::builder("test-token")
        .base_url(mock_server.uri())
        .retry_policy(fast_retries(3))
        .build()
        .unwrap();

    let err = Organization::get(&client, "gone".to_string()).await.unwrap_err();
    assert!(err.is_not_found());
}

// =============================================================================
// Concurrency gate
// =============================================================================

fn request(uri: &str) -> reqwest::Request {
    reqwest::Client::new().get(uri).build().unwrap()
}

#[tokio::test]
async fn test_concurrency_limit_calibrates_from_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/"))
        .respond_with(ResponseTemplate::new(200).insert_header(CONCURRENT_LIMIT_HEADER, "3"))
        .mount(&mock_server)
        .await;

    let gate = ConcurrencyLimit::new(HttpTransport::new(reqwest::Client::new()));
    assert_eq!(gate.limit(), None);

    let response = gate.send(request(&format!("{}/0/", mock_server.uri()))).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(gate.limit(), Some(3));
}

#[tokio::test]
async fn test_concurrency_limit_without_header_stays_uncalibrated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let gate = ConcurrencyLimit::new(HttpTransport::new(reqwest::Client::new()));
    gate.send(request(&format!("{}/0/", mock_server.uri()))).await.unwrap();

    assert_eq!(gate.limit(), None);
}

#[tokio::test]
async fn test_calibrated_gate_bounds_in_flight_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calibrate"))
        .respond_with(ResponseTemplate::new(200).insert_header(CONCURRENT_LIMIT_HEADER, "2"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
        .expect(4)
        .mount(&mock_server)
        .await;

    let gate = Arc::new(ConcurrencyLimit::new(HttpTransport::new(reqwest::Client::new())));
    gate.send(request(&format!("{}/calibrate", mock_server.uri())))
        .await
        .unwrap();
    assert_eq!(gate.limit(), Some(2));

    let started = Instant::now();
    let slow = format!("{}/slow", mock_server.uri());
    let (a, b, c, d) = tokio::join!(
        gate.send(request(&slow)),
        gate.send(request(&slow)),
        gate.send(request(&slow)),
        gate.send(request(&slow)),
    );
    for response in [a, b, c, d] {
        assert_eq!(response.unwrap().status(), 200);
    }

    // Four 200ms requests through two permits take at least two rounds
    assert!(started.elapsed() >= Duration::from_millis(390));
}

// =============================================================================
// Health check
// =============================================================================

#[tokio::test]
async fn test_health_check_returns_raw_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/0/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SentryClient::builder("bad-token")
        .base_url(mock_server.uri())
        .retry_policy(RetryPolicy::none())
        .build()
        .unwrap();
    let response = client.health_check().await.unwrap();

    assert_eq!(response.status(), 401);
}
