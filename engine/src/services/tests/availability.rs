//! HTTP availability provider tests

use super::common::{domains, TEST_KEY, TEST_SECRET};
use crate::error::EngineError;
use crate::services::availability::HttpAvailabilityProvider;
use crate::services::retry::RetryPolicy;
use crate::traits::AvailabilityProvider;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> HttpAvailabilityProvider {
    HttpAvailabilityProvider::new(server.uri(), TEST_KEY, TEST_SECRET)
        .unwrap()
        .with_retry(RetryPolicy::immediate(4))
}

#[tokio::test]
async fn test_bulk_check_maps_answers_and_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/domains/available"))
        .and(header("authorization", "sso-key test-key:test-secret"))
        .and(body_json(json!(["nova.com", "orbit.com", "zeta.com"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "domains": [
                {"domain": "NOVA.com", "available": true, "definitive": true,
                 "price": 11990000, "currency": "USD", "period": 1},
                {"domain": "orbit.com", "available": false, "definitive": true}
            ],
            "errors": [
                {"domain": "zeta.com", "code": "UNSUPPORTED_TLD", "message": "cannot check"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = provider(&server)
        .check_bulk(&domains(&["nova", "orbit", "zeta"]))
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    let nova = &results["nova.com"];
    assert!(nova.available && nova.definitive);
    assert_eq!(nova.price(), Some(11.99));
    assert!(!results["orbit.com"].available);
    let zeta = &results["zeta.com"];
    assert!(!zeta.available);
    assert_eq!(zeta.reason.as_deref(), Some("UNSUPPORTED_TLD: cannot check"));
}

#[tokio::test]
async fn test_requests_are_chunked() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/domains/available"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"domains": []})))
        .expect(3)
        .mount(&server)
        .await;

    let labels: Vec<String> = (0..5).map(|i| format!("name{i}")).collect();
    let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
    let provider = provider(&server).with_chunk_size(2);
    let results = provider.check_bulk(&domains(&labels)).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_auth_failure_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .expect(1)
        .mount(&server)
        .await;

    let error = provider(&server).check_bulk(&domains(&["nova"])).await.unwrap_err();
    assert!(matches!(error, EngineError::AvailabilityAuth { .. }));
    assert_eq!(error.code(), "AVAILABILITY_AUTH_ERROR");
}

#[tokio::test]
async fn test_rate_limit_retries_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"retryAfterSec": 0})))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "domains": [{"domain": "nova.com", "available": true, "definitive": true, "price": 9000000}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = provider(&server).check_bulk(&domains(&["nova"])).await.unwrap();
    assert!(results["nova.com"].available);
}

#[tokio::test]
async fn test_rate_limit_exhaustion_surfaces_hint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(5)
        .mount(&server)
        .await;

    let error = provider(&server).check_bulk(&domains(&["nova"])).await.unwrap_err();
    match error {
        EngineError::AvailabilityRateLimited { attempts, retry_after } => {
            assert_eq!(attempts, 5);
            assert_eq!(retry_after, Some(Duration::ZERO));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let error = provider(&server).check_bulk(&domains(&["nova"])).await.unwrap_err();
    match error {
        EngineError::AvailabilityApi { status, message } => {
            assert_eq!(status, Some(503));
            assert_eq!(message, "maintenance");
        }
        other => panic!("unexpected {other:?}"),
    }
}
