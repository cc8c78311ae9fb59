//! Integration tests for the health endpoint

use actix_web::{test, App};
use serde_json::Value;

use crate::common::{test_config, TestHarness};

#[actix_web::test]
async fn test_health_returns_status_timestamp_and_version() {
    let harness = TestHarness::new(&test_config(true, 60));
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    let timestamp = body["timestamp"].as_str().expect("timestamp missing");
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[actix_web::test]
async fn test_health_bypasses_gate_and_sends_nothing() {
    let harness = TestHarness::new(&test_config(true, 1));
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    for _ in 0..3 {
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
    assert!(harness.chat.messages().is_empty());
}

#[actix_web::test]
async fn test_health_post_returns_error() {
    let harness = TestHarness::new(&test_config(false, 60));
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    let req = test::TestRequest::post().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    // Actix-web returns 404 when no route matches the method
    assert!(resp.status().is_client_error());
}
