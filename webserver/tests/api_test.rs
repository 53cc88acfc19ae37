//! Integration tests for the HTTP API
//!
//! Drives the router directly with `tower::ServiceExt::oneshot`, backed by an
//! engine wired to mock collaborators.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use engine::traits::{MockAvailabilityProvider, MockModelStore, MockNameGenerator};
use engine::{EngineConfig, SearchEngine};
use serde_json::{json, Value};
use shared::{GeneratedName, OptimizerModelState, RawAvailabilityResult, SearchJob};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use webserver::WebServer;

fn test_engine() -> SearchEngine {
    let mut generator = MockNameGenerator::new();
    generator.expect_generate().returning(|_| {
        Ok(["zephyr", "amber", "mint"]
            .iter()
            .map(|name| GeneratedName::new(*name))
            .collect())
    });

    let mut availability = MockAvailabilityProvider::new();
    availability.expect_check_bulk().returning(|domains| {
        Ok(domains
            .iter()
            .map(|d| (d.clone(), RawAvailabilityResult::available(d.clone(), 9_000_000)))
            .collect())
    });

    let mut store = MockModelStore::new();
    store.expect_load().returning(OptimizerModelState::default);
    store.expect_save().returning(|_| Ok(()));

    let config = EngineConfig {
        generation_cooldown: Duration::ZERO,
        generation_jitter: Duration::ZERO,
        seed: Some(7),
        ..EngineConfig::default()
    };
    SearchEngine::new(config, Arc::new(generator), Arc::new(availability), Arc::new(store))
}

fn router() -> Router {
    WebServer::new(test_engine(), "127.0.0.1:0".parse().unwrap()).build_router()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_search(body: Value) -> Request<Body> {
    Request::post("/api/search")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (status, body) = send(&router(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["jobs"], 0);
}

#[tokio::test]
async fn test_submit_and_poll_search() {
    let router = router();

    let (status, body) = send(
        &router,
        post_search(json!({"keywords": "fresh mint tea", "yearly_budget": 30, "max_names": 3, "loop_count": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "queued");
    let job_id = body["job_id"].as_str().unwrap().to_string();

    let mut job: Option<SearchJob> = None;
    for _ in 0..200 {
        let (status, body) = send(&router, get(&format!("/api/search/{job_id}?sort=alphabetical&limit=2"))).await;
        assert_eq!(status, StatusCode::OK);
        let polled: SearchJob = serde_json::from_value(body).unwrap();
        if polled.status.is_terminal() {
            job = Some(polled);
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let job = job.expect("job did not finish");
    assert_eq!(job.status, shared::JobStatus::Done);
    let domains: Vec<_> = job.results.unwrap().domains.into_iter().map(|d| d.domain).collect();
    assert_eq!(domains, vec!["amber.com", "mint.com"]);
}

#[tokio::test]
async fn test_invalid_request_is_rejected() {
    let (status, body) = send(
        &router(),
        post_search(json!({"keywords": "fresh mint tea", "yearly_budget": 30, "max_length": 2})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "max_length");
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let (status, body) = send(&router(), post_search(json!({"yearly_budget": "lots"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let router = router();

    let uri = format!("/api/search/{}", uuid::Uuid::new_v4());
    let (status, body) = send(&router, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "JOB_NOT_FOUND");

    let (status, _) = send(&router, get("/api/search/not-a-job")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bad_sort_mode_is_rejected() {
    let uri = format!("/api/search/{}?sort=loudness", uuid::Uuid::new_v4());
    let (status, body) = send(&router(), get(&uri)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("loudness"));
}
