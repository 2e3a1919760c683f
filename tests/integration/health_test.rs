//! Integration tests for the liveness endpoints.

use crate::common::TestApp;

#[tokio::test]
async fn root_health_check_always_returns_ok() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.client();

    let response = client.get("/health").await;
    response.assert_status(200);

    let body: serde_json::Value = response.json().expect("valid json");
    assert_eq!(body.get("status").and_then(|v| v.as_str()), Some("ok"));
    assert!(body.get("timestamp").is_some());
    assert!(body.get("version").is_some());

    app.cleanup().await.ok();
}

#[tokio::test]
async fn db_health_check_succeeds_against_live_database() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.client();

    let response = client.get("/health/db").await;
    response.assert_status(200);

    app.cleanup().await.ok();
}

#[tokio::test]
async fn redis_health_check_succeeds_against_live_redis() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.client();

    let response = client.get("/health/redis").await;
    response.assert_status(200);

    app.cleanup().await.ok();
}

#[tokio::test]
async fn full_health_check_combines_db_and_redis() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.client();

    let response = client.get("/health/full").await;
    response.assert_status(200);

    app.cleanup().await.ok();
}
