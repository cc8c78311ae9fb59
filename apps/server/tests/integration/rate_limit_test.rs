//! Integration tests for Rate Limiting
//!
//! Tests that the per-client fixed window is enforced on the webhook route.

use actix_web::{test, App};
use chrono::Duration;
use serde_json::Value;

use crate::common::{test_config, ReleaseEventBuilder, TestHarness};

const WEBHOOK: &str = "/webhook/app-distribution";

fn webhook_from(client: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(WEBHOOK)
        .insert_header(("x-forwarded-for", client.to_string()))
        .set_json(ReleaseEventBuilder::new().build())
}

#[actix_web::test]
async fn test_request_over_limit_gets_429() {
    let harness = TestHarness::new(&test_config(false, 2));
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    for _ in 0..2 {
        let resp = test::call_service(&app, webhook_from("203.0.113.7").to_request()).await;
        assert_eq!(resp.status(), 200);
    }

    let resp = test::call_service(&app, webhook_from("203.0.113.7").to_request()).await;
    assert_eq!(resp.status(), 429);

    let retry_header: u64 = resp
        .headers()
        .get("Retry-After")
        .expect("Retry-After header missing")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_header));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Too many requests");
    let retry_after = body["retryAfter"].as_u64().unwrap();
    assert!(retry_after <= 60);
    assert_eq!(retry_after, retry_header);

    // Only the admitted requests reached the pipeline
    assert_eq!(harness.chat.build_messages().len(), 2);

    let entry = harness.state.limiter.entry("203.0.113.7").unwrap();
    assert_eq!(entry.count, 2);
}

#[actix_web::test]
async fn test_first_request_from_new_client_starts_at_one() {
    let harness = TestHarness::new(&test_config(false, 5));
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    let resp = test::call_service(&app, webhook_from("198.51.100.1").to_request()).await;
    assert_eq!(resp.status(), 200);

    let entry = harness.state.limiter.entry("198.51.100.1").unwrap();
    assert_eq!(entry.count, 1);
}

#[actix_web::test]
async fn test_clients_have_separate_windows() {
    let harness = TestHarness::new(&test_config(false, 1));
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    let resp = test::call_service(&app, webhook_from("10.0.0.1").to_request()).await;
    assert_eq!(resp.status(), 200);
    let resp = test::call_service(&app, webhook_from("10.0.0.1").to_request()).await;
    assert_eq!(resp.status(), 429);

    let resp = test::call_service(&app, webhook_from("10.0.0.2").to_request()).await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_window_expiry_admits_again() {
    let harness = TestHarness::new(&test_config(false, 1));
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    let resp = test::call_service(&app, webhook_from("10.0.0.1").to_request()).await;
    assert_eq!(resp.status(), 200);
    let resp = test::call_service(&app, webhook_from("10.0.0.1").to_request()).await;
    assert_eq!(resp.status(), 429);

    harness.clock.advance(Duration::seconds(61));

    let resp = test::call_service(&app, webhook_from("10.0.0.1").to_request()).await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_rate_limit_applies_before_signature_gate() {
    let harness = TestHarness::new(&test_config(true, 1));
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    // Unsigned requests still consume quota
    let resp = test::call_service(&app, webhook_from("10.9.9.9").to_request()).await;
    assert_eq!(resp.status(), 401);
    let resp = test::call_service(&app, webhook_from("10.9.9.9").to_request()).await;
    assert_eq!(resp.status(), 429);
}

#[actix_web::test]
async fn test_other_routes_are_not_rate_limited() {
    let harness = TestHarness::new(&test_config(false, 1));
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    for _ in 0..3 {
        let req = test::TestRequest::get()
            .uri("/health")
            .insert_header(("x-forwarded-for", "10.0.0.1"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }
    assert_eq!(harness.state.limiter.tracked_clients(), 0);
}
