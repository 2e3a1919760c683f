//! Integration tests for the catalog, availability, quote, hold, and
//! direct booking-commit endpoints.

use rust_decimal_macros::dec;
use serde_json::json;

use crate::common::{insert_test_cabin, MockCalendarGateway, MockPaymentGateway, TestApp};

#[tokio::test]
async fn catalog_lists_inserted_cabins() {
    let app = TestApp::new().await.expect("failed to create test app");
    insert_test_cabin(app.db(), "ZB01", dec!(650.00)).await.expect("insert cabin");
    insert_test_cabin(app.db(), "ZB02", dec!(600.00)).await.expect("insert cabin");

    let client = app.client();
    let response = client.get("/cabins").await;
    response.assert_status(200);

    let cabins: Vec<serde_json::Value> = response.json().expect("valid json array");
    assert_eq!(cabins.len(), 2);

    app.cleanup().await.ok();
}

#[tokio::test]
async fn availability_rejects_check_out_before_check_in() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.client();

    let response = client
        .post(
            "/availability",
            &json!({ "check_in": "2026-05-10", "check_out": "2026-05-05" }),
        )
        .await;
    response.assert_status(400);
    crate::assert_error_code!(response, "invalid_input");

    app.cleanup().await.ok();
}

#[tokio::test]
async fn availability_reports_cabin_free_when_calendar_is_empty() {
    let calendar = MockCalendarGateway::start().await;
    calendar.stub_empty_calendar().await;

    let app = TestApp::with_config(|config| {
        config.calendar.base_url = Some(calendar.uri());
        config.calendar.api_key = Some("test-key".to_string());
    })
    .await
    .expect("failed to create test app");

    let cabin = insert_test_cabin(app.db(), "ZB01", dec!(650.00)).await.expect("insert cabin");
    let client = app.client();

    let response = client
        .post(
            "/availability",
            &json!({
                "check_in": "2026-05-10",
                "check_out": "2026-05-12",
                "cabin": cabin.short_code,
            }),
        )
        .await;
    response.assert_status(200);

    let body: serde_json::Value = response.json().expect("valid json");
    let cabins = body.get("cabins").and_then(|v| v.as_array()).expect("cabins array");
    assert_eq!(cabins.len(), 1);

    app.cleanup().await.ok();
}

#[tokio::test]
async fn quote_matches_pricing_engine_for_a_basic_midweek_stay() {
    let app = TestApp::new().await.expect("failed to create test app");
    let cabin = insert_test_cabin(app.db(), "ZB01", dec!(500.00)).await.expect("insert cabin");
    let client = app.client();

    // Mon 2026-03-09 -> Wed 2026-03-11, two midweek nights, no weekend/holiday surcharge.
    let response = client
        .post(
            "/quote",
            &json!({
                "cabin": cabin.short_code,
                "check_in": "2026-03-09",
                "check_out": "2026-03-11",
            }),
        )
        .await;
    response.assert_status(200);

    let breakdown: serde_json::Value = response.json().expect("valid json");
    assert_eq!(breakdown.get("nights").and_then(|v| v.as_i64()), Some(2));
    assert_eq!(
        breakdown.get("total").and_then(|v| v.as_str()),
        Some("1000.00")
    );

    app.cleanup().await.ok();
}

#[tokio::test]
async fn quote_for_unknown_cabin_is_not_found() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.client();

    let response = client
        .post(
            "/quote",
            &json!({ "cabin": "nonexistent", "check_in": "2026-03-09", "check_out": "2026-03-11" }),
        )
        .await;
    response.assert_status(404);
    crate::assert_error_code!(response, "cabin_not_found");

    app.cleanup().await.ok();
}

#[tokio::test]
async fn calendar_month_view_lists_free_days() {
    let calendar = MockCalendarGateway::start().await;
    calendar.stub_empty_calendar().await;

    let app = TestApp::with_config(|config| {
        config.calendar.base_url = Some(calendar.uri());
        config.calendar.api_key = Some("test-key".to_string());
    })
    .await
    .expect("failed to create test app");

    let cabin = insert_test_cabin(app.db(), "ZB01", dec!(650.00)).await.expect("insert cabin");
    let client = app.client();

    let response = client
        .get(&format!("/cabin/calendar/{}?year=2026&month=5", cabin.short_code))
        .await;
    response.assert_status(200);

    let body: serde_json::Value = response.json().expect("valid json");
    let free_days = body.get("free_days").and_then(|v| v.as_array()).expect("free_days array");
    assert_eq!(free_days.len(), 31);

    app.cleanup().await.ok();
}

#[tokio::test]
async fn hold_create_get_and_release_lifecycle() {
    let app = TestApp::new().await.expect("failed to create test app");
    let cabin = insert_test_cabin(app.db(), "ZB01", dec!(650.00)).await.expect("insert cabin");
    let client = app.client();

    let create = client
        .post(
            "/hold",
            &json!({
                "cabin": cabin.short_code,
                "check_in": "2026-06-01",
                "check_out": "2026-06-03",
                "customer_name": "Dana Levi",
            }),
        )
        .await;
    create.assert_status(200);

    let hold: serde_json::Value = create.json().expect("valid json");
    let hold_id = hold.get("id").and_then(|v| v.as_str()).expect("hold id").to_string();

    let get = client.get(&format!("/hold/{hold_id}")).await;
    get.assert_status(200);
    crate::assert_json_contains!(get, "id" => hold_id.clone());

    let release = client.delete(&format!("/hold/{hold_id}")).await;
    release.assert_status(200);
    crate::assert_json_contains!(release, "released" => true);

    let get_after_release = client.get(&format!("/hold/{hold_id}")).await;
    get_after_release.assert_status(404);
    crate::assert_error_code!(get_after_release, "hold_not_found");

    app.cleanup().await.ok();
}

#[tokio::test]
async fn second_hold_on_same_dates_is_rejected_as_conflict() {
    let app = TestApp::new().await.expect("failed to create test app");
    let cabin = insert_test_cabin(app.db(), "ZB01", dec!(650.00)).await.expect("insert cabin");
    let client = app.client();

    let first = client
        .post(
            "/hold",
            &json!({
                "cabin": cabin.short_code,
                "check_in": "2026-06-10",
                "check_out": "2026-06-12",
            }),
        )
        .await;
    first.assert_status(200);

    let second = client
        .post(
            "/hold",
            &json!({
                "cabin": cabin.short_code,
                "check_in": "2026-06-10",
                "check_out": "2026-06-12",
            }),
        )
        .await;
    assert!(second.status == 409 || second.status == 500);

    app.cleanup().await.ok();
}

#[tokio::test]
async fn hold_for_unknown_cabin_is_not_found() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.client();

    let response = client
        .post(
            "/hold",
            &json!({ "cabin": "nonexistent", "check_in": "2026-06-01", "check_out": "2026-06-03" }),
        )
        .await;
    response.assert_status(404);
    crate::assert_error_code!(response, "cabin_not_found");

    app.cleanup().await.ok();
}

#[tokio::test]
async fn releasing_unknown_hold_is_gone() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.client();

    let response = client.delete(&format!("/hold/{}", uuid::Uuid::new_v4())).await;
    response.assert_status(404);

    app.cleanup().await.ok();
}

#[tokio::test]
async fn direct_booking_commit_creates_calendar_event_and_payment_intent() {
    let calendar = MockCalendarGateway::start().await;
    calendar.stub_empty_calendar().await;
    calendar.stub_insert_event("evt_test_1").await;

    let payment = MockPaymentGateway::start().await;
    payment.stub_create_intent("pi_test_1").await;

    let app = TestApp::with_config(|config| {
        config.calendar.base_url = Some(calendar.uri());
        config.calendar.api_key = Some("test-key".to_string());
        config.payment.base_url = Some(payment.uri());
        config.payment.secret_key = Some("test-key".to_string());
        config.payment.webhook_secret = Some("whsec_test_secret_for_integration_tests".to_string());
    })
    .await
    .expect("failed to create test app");

    let cabin = insert_test_cabin(app.db(), "ZB01", dec!(500.00)).await.expect("insert cabin");
    let client = app.client();

    let response = client
        .post(
            "/book",
            &json!({
                "cabin": cabin.short_code,
                "check_in": "2026-07-10",
                "check_out": "2026-07-12",
                "adults": 2,
                "kids": 0,
                "customer_name": "Noa Cohen",
                "customer_email": "noa@example.test",
                "create_payment": true,
            }),
        )
        .await;
    response.assert_status(200);

    let booking: serde_json::Value = response.json().expect("valid json");
    assert_eq!(booking.get("status").and_then(|v| v.as_str()), Some("confirmed"));
    assert_eq!(
        booking.get("calendar_event_ref").and_then(|v| v.as_str()),
        Some("evt_test_1")
    );

    app.cleanup().await.ok();
}

#[tokio::test]
async fn booking_commit_with_existing_hold_converts_it() {
    let calendar = MockCalendarGateway::start().await;
    calendar.stub_empty_calendar().await;
    calendar.stub_insert_event("evt_test_2").await;

    let app = TestApp::with_config(|config| {
        config.calendar.base_url = Some(calendar.uri());
        config.calendar.api_key = Some("test-key".to_string());
    })
    .await
    .expect("failed to create test app");

    let cabin = insert_test_cabin(app.db(), "ZB01", dec!(500.00)).await.expect("insert cabin");
    let client = app.client();

    let hold = client
        .post(
            "/hold",
            &json!({
                "cabin": cabin.short_code,
                "check_in": "2026-08-01",
                "check_out": "2026-08-03",
                "customer_name": "Yossi Mizrahi",
            }),
        )
        .await;
    hold.assert_status(200);
    let hold_id = hold.json_field("id").expect("hold id");

    let booking = client
        .post(
            "/book",
            &json!({
                "cabin": cabin.short_code,
                "check_in": "2026-08-01",
                "check_out": "2026-08-03",
                "adults": 2,
                "kids": 0,
                "hold_id": hold_id,
                "create_payment": false,
            }),
        )
        .await;
    booking.assert_status(200);
    crate::assert_json_contains!(booking, "status" => "confirmed");

    app.cleanup().await.ok();
}

#[tokio::test]
async fn booking_commit_conflicts_when_cabin_is_already_booked() {
    let calendar = MockCalendarGateway::start().await;

    // One pre-existing event fully covering the requested window.
    {
        use wiremock::matchers::{method, path_regex};
        use wiremock::{Mock, ResponseTemplate};
        Mock::given(method("GET"))
            .and(path_regex(r"^/calendars/.+/events$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "events": [{
                    "id": "evt_existing",
                    "htmlLink": "https://calendar.example.test/events/evt_existing",
                    "start": {"dateTime": "2026-09-01T00:00:00Z"},
                    "end": {"dateTime": "2026-09-05T00:00:00Z"},
                    "summary": "Booking",
                }]
            })))
            .mount(&calendar.server)
            .await;
    }

    let app = TestApp::with_config(|config| {
        config.calendar.base_url = Some(calendar.uri());
        config.calendar.api_key = Some("test-key".to_string());
    })
    .await
    .expect("failed to create test app");

    let cabin = insert_test_cabin(app.db(), "ZB01", dec!(500.00)).await.expect("insert cabin");
    let client = app.client();

    let response = client
        .post(
            "/book",
            &json!({
                "cabin": cabin.short_code,
                "check_in": "2026-09-02",
                "check_out": "2026-09-04",
                "adults": 2,
                "kids": 0,
                "create_payment": false,
            }),
        )
        .await;
    response.assert_status(409);
    crate::assert_error_code!(response, "cabin_busy");

    app.cleanup().await.ok();
}

#[tokio::test]
async fn admin_can_cancel_a_confirmed_booking() {
    let calendar = MockCalendarGateway::start().await;
    calendar.stub_empty_calendar().await;
    calendar.stub_insert_event("evt_test_3").await;
    calendar.stub_delete_event().await;

    let app = TestApp::with_config(|config| {
        config.calendar.base_url = Some(calendar.uri());
        config.calendar.api_key = Some("test-key".to_string());
    })
    .await
    .expect("failed to create test app");

    let cabin = insert_test_cabin(app.db(), "ZB01", dec!(500.00)).await.expect("insert cabin");
    let client = app.client();

    let booking = client
        .post(
            "/book",
            &json!({
                "cabin": cabin.short_code,
                "check_in": "2026-10-01",
                "check_out": "2026-10-03",
                "adults": 2,
                "kids": 0,
                "create_payment": false,
            }),
        )
        .await;
    booking.assert_status(200);
    let booking_id = booking.json_field("id").expect("booking id");

    let admin_client = app.admin_client();
    let cancel = admin_client.post(&format!("/admin/bookings/{booking_id}/cancel"), &json!({})).await;
    cancel.assert_status(200);

    let detail = admin_client.get(&format!("/admin/bookings/{booking_id}")).await;
    crate::assert_json_contains!(detail, "status" => "cancelled");

    app.cleanup().await.ok();
}
