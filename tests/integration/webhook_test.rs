//! Integration tests for the payment gateway webhook sink
//! (`POST /webhooks/:gateway`).

use rust_decimal_macros::dec;
use serde_json::json;

use crate::common::{insert_test_cabin, sign_webhook_payload, TestApp, TEST_PAYMENT_WEBHOOK_SECRET};

async fn seed_pending_transaction(app: &TestApp, payment_ref: &str) -> uuid::Uuid {
    let cabin = insert_test_cabin(app.db(), "ZB01", dec!(650.00)).await.expect("insert cabin");

    let booking_id: uuid::Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO bookings (id, cabin_id, check_in_date, check_out_date, adults, kids, total_price, status)
        VALUES (gen_random_uuid(), $1, '2026-11-01', '2026-11-03', 2, 0, 1300.00, 'confirmed')
        RETURNING id
        "#,
    )
    .bind(cabin.id)
    .fetch_one(app.db())
    .await
    .expect("insert booking");

    sqlx::query(
        r#"
        INSERT INTO transactions (booking_id, payment_ref, amount, currency, status)
        VALUES ($1, $2, 1300.00, 'ILS', 'pending')
        "#,
    )
    .bind(booking_id)
    .bind(payment_ref)
    .execute(app.db())
    .await
    .expect("insert pending transaction");

    booking_id
}

fn app_with_webhook_secret() -> impl FnOnce(&mut cabin_reservation_backend::config::Settings) {
    |config: &mut cabin_reservation_backend::config::Settings| {
        config.payment.webhook_secret = Some(TEST_PAYMENT_WEBHOOK_SECRET.to_string());
    }
}

#[tokio::test]
async fn webhook_with_invalid_signature_is_rejected() {
    let app = TestApp::with_config(app_with_webhook_secret()).await.expect("failed to create test app");
    let client = app.client();

    let payload = br#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_bogus"}}}"#.to_vec();

    let response = client
        .post_raw("/webhooks/stripe", payload, &[("x-webhook-signature", "not-a-real-signature")])
        .await;
    response.assert_status(401);
    crate::assert_error_code!(response, "invalid_webhook_signature");

    app.cleanup().await.ok();
}

#[tokio::test]
async fn webhook_missing_signature_header_is_rejected() {
    let app = TestApp::with_config(app_with_webhook_secret()).await.expect("failed to create test app");
    let client = app.client();

    let payload = br#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_bogus"}}}"#.to_vec();

    let response = client.post_raw("/webhooks/stripe", payload, &[]).await;
    response.assert_status(401);
    crate::assert_error_code!(response, "invalid_webhook_signature");

    app.cleanup().await.ok();
}

#[tokio::test]
async fn successful_payment_webhook_marks_transaction_completed() {
    let app = TestApp::with_config(app_with_webhook_secret()).await.expect("failed to create test app");
    let booking_id = seed_pending_transaction(&app, "pi_success_1").await;
    let client = app.client();

    let payload = json!({
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": "pi_success_1" } }
    });
    let body = serde_json::to_vec(&payload).unwrap();
    let signature = sign_webhook_payload(TEST_PAYMENT_WEBHOOK_SECRET, &body);

    let response = client.post_raw("/webhooks/stripe", body, &[("x-webhook-signature", &signature)]).await;
    response.assert_status(200);
    crate::assert_json_contains!(response, "status" => "completed", "booking_id" => booking_id.to_string());

    let status: String = sqlx::query_scalar("SELECT status FROM transactions WHERE payment_ref = $1")
        .bind("pi_success_1")
        .fetch_one(app.db())
        .await
        .expect("query transaction status");
    assert_eq!(status, "completed");

    app.cleanup().await.ok();
}

#[tokio::test]
async fn failed_payment_webhook_marks_transaction_failed() {
    let app = TestApp::with_config(app_with_webhook_secret()).await.expect("failed to create test app");
    seed_pending_transaction(&app, "pi_failed_1").await;
    let client = app.client();

    let payload = json!({
        "type": "payment_intent.payment_failed",
        "data": {
            "object": {
                "id": "pi_failed_1",
                "last_payment_error": { "message": "Your card was declined." }
            }
        }
    });
    let body = serde_json::to_vec(&payload).unwrap();
    let signature = sign_webhook_payload(TEST_PAYMENT_WEBHOOK_SECRET, &body);

    let response = client.post_raw("/webhooks/stripe", body, &[("x-webhook-signature", &signature)]).await;
    response.assert_status(200);
    crate::assert_json_contains!(response, "status" => "failed");

    let status: String = sqlx::query_scalar("SELECT status FROM transactions WHERE payment_ref = $1")
        .bind("pi_failed_1")
        .fetch_one(app.db())
        .await
        .expect("query transaction status");
    assert_eq!(status, "failed");

    app.cleanup().await.ok();
}

#[tokio::test]
async fn webhook_for_unknown_payment_ref_is_acknowledged_and_ignored() {
    let app = TestApp::with_config(app_with_webhook_secret()).await.expect("failed to create test app");
    let client = app.client();

    let payload = json!({
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": "pi_never_created" } }
    });
    let body = serde_json::to_vec(&payload).unwrap();
    let signature = sign_webhook_payload(TEST_PAYMENT_WEBHOOK_SECRET, &body);

    let response = client.post_raw("/webhooks/stripe", body, &[("x-webhook-signature", &signature)]).await;
    response.assert_status(200);
    crate::assert_json_contains!(response, "acknowledged" => true, "ignored" => true);

    app.cleanup().await.ok();
}
