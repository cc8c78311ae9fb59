//! Integration tests for the manual test endpoints

use std::sync::Arc;

use actix_web::{test, App};
use distbot::models::{BuildMetadata, Platform};
use serde_json::{json, Value};

use crate::common::{test_config, KnownReleaseApi, TestHarness};

#[actix_web::test]
async fn test_missing_fields_return_400() {
    let harness = TestHarness::new(&test_config(false, 100));
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    for body in [
        json!({}),
        json!({ "releaseId": "abc" }),
        json!({ "platform": "ios" }),
        json!({ "releaseId": "", "platform": "ios" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/test/notification")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "body {}", body);

        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["message"], "Missing required fields: releaseId, platform");
    }
    assert!(harness.chat.messages().is_empty());
}

#[actix_web::test]
async fn test_unparseable_body_returns_json_400() {
    let harness = TestHarness::new(&test_config(false, 100));
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    let requests = [
        test::TestRequest::post()
            .uri("/test/notification")
            .insert_header(("content-type", "application/json"))
            .set_payload("releaseId=abc"),
        test::TestRequest::post()
            .uri("/test/notification")
            .set_payload(r#"{"releaseId":"abc","platform":"ios"}"#),
    ];

    for req in requests {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), 400);

        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["error"], "Bad request");
        assert!(json["message"].is_string());
    }
    assert!(harness.chat.messages().is_empty());
}

#[actix_web::test]
async fn test_body_larger_than_default_json_limit_is_accepted() {
    let harness = TestHarness::new(&test_config(false, 100));
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    // Over actix's 2 MB default, under the 10 MB limit
    let body = json!({
        "releaseId": "abc",
        "platform": "ios",
        "padding": "x".repeat(3 * 1024 * 1024),
    });
    let req = test::TestRequest::post()
        .uri("/test/notification")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(harness.chat.build_messages().len(), 1);
}

#[actix_web::test]
async fn test_unknown_platform_returns_400() {
    let harness = TestHarness::new(&test_config(false, 100));
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/test/notification")
        .set_json(json!({ "releaseId": "abc", "platform": "symbian" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    assert!(harness.chat.messages().is_empty());
}

#[actix_web::test]
async fn test_unknown_release_sends_sample_build() {
    let harness = TestHarness::new(&test_config(false, 100));
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/test/notification")
        .set_json(json!({ "releaseId": "abc", "platform": "ios" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["success"], true);

    let messages = harness.chat.build_messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "New IOS build: Test App (IOS) 1.0.0");
}

#[actix_web::test]
async fn test_known_release_uses_real_metadata() {
    let metadata = BuildMetadata {
        platform: Platform::Android,
        app_name: "Shop".to_string(),
        version: "3.1.0".to_string(),
        build_number: "310".to_string(),
        release_date: "2024-05-30T08:00:00Z".to_string(),
        download_url: "https://dist.test/i/rel-42".to_string(),
        release_notes: None,
        file_size: Some("48 MB".to_string()),
        md5_hash: None,
    };
    let api = Arc::new(KnownReleaseApi {
        release_id: "rel-42".to_string(),
        metadata,
    });
    let harness = TestHarness::with_api(&test_config(false, 100), api);
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/test/notification")
        .set_json(json!({ "releaseId": "rel-42", "platform": "ios" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let messages = harness.chat.build_messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "New ANDROID build: Shop 3.1.0");
}

#[actix_web::test]
async fn test_delivery_failure_returns_500_after_error_report() {
    let harness = TestHarness::new(&test_config(false, 100));
    harness.chat.fail_builds();
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/test/notification")
        .set_json(json!({ "releaseId": "abc", "platform": "android" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    let errors = harness.chat.error_messages();
    assert_eq!(errors.len(), 1);
    let context = errors[0].blocks[2]["text"]["text"].as_str().unwrap();
    assert!(context.contains("\"test\": true"));
    assert!(context.contains("\"releaseId\": \"abc\""));

    assert_eq!(resp.status(), 500);
    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["error"], "Failed to send test notification");
}

#[actix_web::test]
async fn test_health_check_posts_static_message() {
    let harness = TestHarness::new(&test_config(false, 100));
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    let req = test::TestRequest::post().uri("/test/health-check").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let messages = harness.chat.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].text.contains("Test notification"));
}

#[actix_web::test]
async fn test_health_check_failure_returns_500() {
    let harness = TestHarness::new(&test_config(false, 100));
    harness.chat.fail_all();
    let app = test::init_service(App::new().configure(|cfg| harness.state.configure(cfg))).await;

    let req = test::TestRequest::post().uri("/test/health-check").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    // No error report for health checks
    assert_eq!(harness.chat.messages().len(), 1);
}
