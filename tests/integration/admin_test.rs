//! Integration tests for the `/admin/*` surface, gated by the shared
//! `X-Admin-Api-Key` header (see `middleware::admin`).

use rust_decimal_macros::dec;
use serde_json::json;

use crate::common::{insert_test_cabin, TestApp};

#[tokio::test]
async fn missing_admin_key_is_rejected() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.client();

    let response = client.get("/admin/holds").await;
    response.assert_status(401);
    crate::assert_error_code!(response, "missing_admin_auth");

    app.cleanup().await.ok();
}

#[tokio::test]
async fn wrong_admin_key_is_rejected() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.client().with_admin_key("totally-wrong-key");

    let response = client.get("/admin/holds").await;
    response.assert_status(403);
    crate::assert_error_code!(response, "invalid_admin_auth");

    app.cleanup().await.ok();
}

#[tokio::test]
async fn correct_admin_key_lists_active_holds() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.admin_client();

    let response = client.get("/admin/holds").await;
    response.assert_status(200);

    let holds: Vec<serde_json::Value> = response.json().expect("valid json array");
    assert!(holds.is_empty());

    app.cleanup().await.ok();
}

#[tokio::test]
async fn audit_list_reflects_business_fact_upsert() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.admin_client();

    let upsert = client
        .post(
            "/admin/business-facts",
            &json!({
                "fact_key": "late_checkout",
                "fact_value": "Late checkout until 13:00 is available on request.",
                "category": "policy",
                "description": "Late checkout policy",
            }),
        )
        .await;
    upsert.assert_status(200);

    let audit = client.get("/admin/audit?table_name=business_facts").await;
    audit.assert_status(200);
    let entries: Vec<serde_json::Value> = audit.json().expect("valid json array");
    assert!(entries
        .iter()
        .any(|e| e.get("record_id").and_then(|v| v.as_str()) == Some("late_checkout")));

    app.cleanup().await.ok();
}

#[tokio::test]
async fn business_facts_upsert_then_list_then_deactivate() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.admin_client();

    let upsert = client
        .post(
            "/admin/business-facts",
            &json!({
                "fact_key": "pool_hours",
                "fact_value": "The pool is open 08:00-20:00.",
                "category": "amenities",
                "description": "Pool operating hours",
            }),
        )
        .await;
    upsert.assert_status(200);
    crate::assert_json_contains!(upsert, "fact_key" => "pool_hours", "is_active" => true);

    let list = client.get("/admin/business-facts?category=amenities").await;
    list.assert_status(200);
    let facts: Vec<serde_json::Value> = list.json().expect("valid json array");
    assert!(facts.iter().any(|f| f.get("fact_key").and_then(|v| v.as_str()) == Some("pool_hours")));

    let deactivate = client.delete("/admin/business-facts/pool_hours").await;
    deactivate.assert_status(200);
    crate::assert_json_contains!(deactivate, "deactivated" => true);

    let list_after = client.get("/admin/business-facts?category=amenities").await;
    let facts_after: Vec<serde_json::Value> = list_after.json().expect("valid json array");
    assert!(!facts_after
        .iter()
        .any(|f| f.get("fact_key").and_then(|v| v.as_str()) == Some("pool_hours")));

    app.cleanup().await.ok();
}

#[tokio::test]
async fn deactivating_unknown_business_fact_is_not_found() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.admin_client();

    let response = client.delete("/admin/business-facts/does-not-exist").await;
    response.assert_status(404);

    app.cleanup().await.ok();
}

#[tokio::test]
async fn faq_suggest_approve_and_update_lifecycle() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.admin_client();

    sqlx::query(
        "INSERT INTO faqs (id, question, answer, approved, suggested_answer) VALUES (gen_random_uuid(), $1, '', false, $2)",
    )
    .bind("Do you allow late arrivals past midnight?")
    .bind("Yes, just let us know the expected arrival time in advance.")
    .execute(app.db())
    .await
    .expect("insert pending faq");

    let pending = client.get("/admin/faq/pending").await;
    pending.assert_status(200);
    let pending_faqs: Vec<serde_json::Value> = pending.json().expect("valid json array");
    assert_eq!(pending_faqs.len(), 1);
    let faq_id = pending_faqs[0].get("id").and_then(|v| v.as_str()).unwrap().to_string();

    let approve = client
        .post(
            "/admin/faq/approve",
            &json!({
                "id": faq_id,
                "approve": true,
                "approved_by": "host@example.test",
            }),
        )
        .await;
    approve.assert_status(200);
    crate::assert_json_contains!(approve, "approved" => true);

    let all = client.get("/admin/faq/all").await;
    let all_faqs: Vec<serde_json::Value> = all.json().expect("valid json array");
    assert_eq!(all_faqs.len(), 1);
    assert_eq!(
        all_faqs[0].get("answer").and_then(|v| v.as_str()),
        Some("Yes, just let us know the expected arrival time in advance.")
    );

    let update = client
        .put(
            &format!("/admin/faq/{faq_id}"),
            &json!({ "answer": "Yes, please text us your arrival time." }),
        )
        .await;
    update.assert_status(200);
    crate::assert_json_contains!(update, "answer" => "Yes, please text us your arrival time.");

    let delete = client.delete(&format!("/admin/faq/{faq_id}")).await;
    delete.assert_status(200);
    crate::assert_json_contains!(delete, "deleted" => true);

    app.cleanup().await.ok();
}

#[tokio::test]
async fn rejecting_a_suggested_faq_deletes_it() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.admin_client();

    let id: uuid::Uuid = sqlx::query_scalar(
        "INSERT INTO faqs (id, question, answer, approved, suggested_answer) VALUES (gen_random_uuid(), $1, '', false, $2) RETURNING id",
    )
    .bind("Can we bring a drone?")
    .bind("Drones aren't permitted over neighboring properties.")
    .fetch_one(app.db())
    .await
    .expect("insert pending faq");

    let reject = client
        .post("/admin/faq/approve", &json!({ "id": id, "approve": false }))
        .await;
    reject.assert_status(200);

    let all = client.get("/admin/faq/all").await;
    let all_faqs: Vec<serde_json::Value> = all.json().expect("valid json array");
    assert!(all_faqs.is_empty());

    app.cleanup().await.ok();
}

#[tokio::test]
async fn admin_booking_listing_and_cancellation() {
    let app = TestApp::new().await.expect("failed to create test app");
    let cabin = insert_test_cabin(app.db(), "ZB01", dec!(650.00)).await.expect("insert cabin");
    let client = app.admin_client();

    let booking_id: uuid::Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO bookings (id, cabin_id, check_in_date, check_out_date, adults, kids, total_price, status)
        VALUES (gen_random_uuid(), $1, '2026-03-10', '2026-03-12', 2, 0, 1300.00, 'confirmed')
        RETURNING id
        "#,
    )
    .bind(cabin.id)
    .fetch_one(app.db())
    .await
    .expect("insert booking");

    let list = client.get("/admin/bookings").await;
    list.assert_status(200);
    let bookings: Vec<serde_json::Value> = list.json().expect("valid json array");
    assert_eq!(bookings.len(), 1);

    let detail = client.get(&format!("/admin/bookings/{booking_id}")).await;
    detail.assert_status(200);
    crate::assert_json_contains!(detail, "status" => "confirmed");

    let cancel = client.post(&format!("/admin/bookings/{booking_id}/cancel"), &json!({})).await;
    cancel.assert_status(200);
    crate::assert_json_contains!(cancel, "cancelled" => true);

    let detail_after = client.get(&format!("/admin/bookings/{booking_id}")).await;
    crate::assert_json_contains!(detail_after, "status" => "cancelled");

    app.cleanup().await.ok();
}

#[tokio::test]
async fn admin_booking_list_filters_by_status() {
    let app = TestApp::new().await.expect("failed to create test app");
    let cabin = insert_test_cabin(app.db(), "ZB02", dec!(600.00)).await.expect("insert cabin");
    let client = app.admin_client();

    sqlx::query(
        r#"
        INSERT INTO bookings (id, cabin_id, check_in_date, check_out_date, adults, kids, total_price, status)
        VALUES
            (gen_random_uuid(), $1, '2026-04-01', '2026-04-03', 2, 0, 1200.00, 'confirmed'),
            (gen_random_uuid(), $1, '2026-04-10', '2026-04-12', 2, 0, 1200.00, 'cancelled')
        "#,
    )
    .bind(cabin.id)
    .execute(app.db())
    .await
    .expect("insert bookings");

    let confirmed_only = client.get("/admin/bookings?status=confirmed").await;
    let bookings: Vec<serde_json::Value> = confirmed_only.json().expect("valid json array");
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].get("status").and_then(|v| v.as_str()), Some("confirmed"));

    app.cleanup().await.ok();
}
