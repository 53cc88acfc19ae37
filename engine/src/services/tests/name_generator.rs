//! HTTP name generator tests

use super::common::generation_request;
use crate::error::EngineError;
use crate::services::name_generator::HttpNameGenerator;
use crate::services::retry::RetryPolicy;
use crate::traits::NameGenerator;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn generator(server: &MockServer) -> HttpNameGenerator {
    HttpNameGenerator::new(format!("{}/generate", server.uri()))
        .unwrap()
        .with_retry(RetryPolicy::immediate(2))
}

#[tokio::test]
async fn test_generator_posts_request_and_parses_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_partial_json(json!({
            "keywords": "solar coffee",
            "style": "brandable",
            "randomness": "high",
            "blacklist": "bean",
            "max_length": 12,
            "count": 40
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "names": [
                {"display_name": "SolarSip", "premium": false},
                {"display_name": "Brewlux", "premium": true},
                {"display_name": "   "}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let names = generator(&server).generate(&generation_request(40)).await.unwrap();
    assert_eq!(names.len(), 2);
    assert_eq!(names[0].display_name, "SolarSip");
    assert!(names[1].premium);
}

#[tokio::test]
async fn test_generator_retries_twice_then_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let error = generator(&server).generate(&generation_request(10)).await.unwrap_err();
    match &error {
        EngineError::Generation { attempts, message } => {
            assert_eq!(*attempts, 3);
            assert!(message.contains("502"));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(error.code(), "GENERATION_ERROR");
}

#[tokio::test]
async fn test_empty_batch_counts_as_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"names": []})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "names": [{"display_name": "Solaris"}]
        })))
        .mount(&server)
        .await;

    let names = generator(&server).generate(&generation_request(10)).await.unwrap();
    assert_eq!(names.len(), 1);
    assert!(!names[0].premium);
}
