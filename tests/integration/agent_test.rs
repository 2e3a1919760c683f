//! Integration tests for the Hebrew/English conversational agent
//! (`POST /agent/chat`).

use serde_json::json;

use crate::common::{MockCalendarGateway, TestApp};

#[tokio::test]
async fn hebrew_greeting_is_classified_and_replied_to() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.client();

    let response = client.post("/agent/chat", &json!({ "message": "שלום, מה שלומך?" })).await;
    response.assert_status(200);

    let body: serde_json::Value = response.json().expect("valid json");
    assert_eq!(body.get("intent").and_then(|v| v.as_str()), Some("greeting"));
    assert!(body.get("reply").and_then(|v| v.as_str()).unwrap().contains("שלום"));
    assert!(body.get("conversation_id").is_some());

    app.cleanup().await.ok();
}

#[tokio::test]
async fn business_fact_shortcut_answers_verbatim() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.client();

    let response = client.post("/agent/chat", &json!({ "message": "is there parking?" })).await;
    response.assert_status(200);

    let body: serde_json::Value = response.json().expect("valid json");
    assert_eq!(body.get("intent").and_then(|v| v.as_str()), Some("business_fact"));
    assert_eq!(
        body.get("reply").and_then(|v| v.as_str()),
        Some("Free private parking is available on-site at every cabin.")
    );

    app.cleanup().await.ok();
}

#[tokio::test]
async fn approved_faq_shortcut_answers_without_reclassifying() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.client();

    sqlx::query(
        "INSERT INTO faqs (id, question, answer, approved) VALUES (gen_random_uuid(), $1, $2, true)",
    )
    .bind("can we have a bonfire")
    .bind("Bonfires are allowed in the designated fire pit after 18:00.")
    .execute(app.db())
    .await
    .expect("insert approved faq");

    let response = client.post("/agent/chat", &json!({ "message": "can we have a bonfire tonight?" })).await;
    response.assert_status(200);

    let body: serde_json::Value = response.json().expect("valid json");
    assert_eq!(body.get("intent").and_then(|v| v.as_str()), Some("faq"));
    assert_eq!(
        body.get("reply").and_then(|v| v.as_str()),
        Some("Bonfires are allowed in the designated fire pit after 18:00.")
    );

    app.cleanup().await.ok();
}

#[tokio::test]
async fn quote_intent_returns_a_price_in_hebrew_prose() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.client();

    let response = client
        .post("/agent/chat", &json!({ "message": "כמה עולה ZB01 10/07/2026" }))
        .await;
    response.assert_status(200);

    let body: serde_json::Value = response.json().expect("valid json");
    assert_eq!(body.get("intent").and_then(|v| v.as_str()), Some("quote"));
    let reply = body.get("reply").and_then(|v| v.as_str()).unwrap();
    assert!(reply.contains("ש\"ח"));

    app.cleanup().await.ok();
}

#[tokio::test]
async fn availability_intent_checks_the_calendar_gateway() {
    let calendar = MockCalendarGateway::start().await;
    calendar.stub_empty_calendar().await;

    let app = TestApp::with_config(|config| {
        config.calendar.base_url = Some(calendar.uri());
        config.calendar.api_key = Some("test-key".to_string());
    })
    .await
    .expect("failed to create test app");

    let client = app.client();

    let response = client
        .post("/agent/chat", &json!({ "message": "פנוי ZB01 10/07/2026" }))
        .await;
    response.assert_status(200);

    let body: serde_json::Value = response.json().expect("valid json");
    assert_eq!(body.get("intent").and_then(|v| v.as_str()), Some("availability"));

    app.cleanup().await.ok();
}

#[tokio::test]
async fn hold_intent_creates_a_real_hold() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.client();

    let response = client
        .post(
            "/agent/chat",
            &json!({ "message": "לשריין את ZB01 01/08/2026 על שם דנה לוי" }),
        )
        .await;
    response.assert_status(200);

    let body: serde_json::Value = response.json().expect("valid json");
    assert_eq!(body.get("intent").and_then(|v| v.as_str()), Some("hold"));
    let reply = body.get("reply").and_then(|v| v.as_str()).unwrap();
    assert!(reply.contains("שריינתי"));

    let holds = app.admin_client().get("/admin/holds").await;
    let holds_json: Vec<serde_json::Value> = holds.json().expect("valid json array");
    assert_eq!(holds_json.len(), 1);

    app.cleanup().await.ok();
}

#[tokio::test]
async fn conversation_context_carries_cabin_and_dates_across_turns() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.client();

    let first = client
        .post("/agent/chat", &json!({ "message": "כמה עולה ZB02 10/07/2026" }))
        .await;
    first.assert_status(200);
    let first_body: serde_json::Value = first.json().expect("valid json");
    let conversation_id = first_body.get("conversation_id").and_then(|v| v.as_str()).unwrap().to_string();

    let second = client
        .post(
            "/agent/chat",
            &json!({ "conversation_id": conversation_id, "message": "כן" }),
        )
        .await;
    second.assert_status(200);
    let second_body: serde_json::Value = second.json().expect("valid json");
    assert_eq!(second_body.get("intent").and_then(|v| v.as_str()), Some("confirm"));
    assert_eq!(
        second_body.get("conversation_id").and_then(|v| v.as_str()),
        Some(conversation_id.as_str())
    );

    app.cleanup().await.ok();
}

#[tokio::test]
async fn unrecognized_message_falls_back_to_unknown_and_suggests_a_faq() {
    let app = TestApp::new().await.expect("failed to create test app");
    let client = app.client();

    let response = client
        .post("/agent/chat", &json!({ "message": "xyz completely unrelated gibberish" }))
        .await;
    response.assert_status(200);

    let body: serde_json::Value = response.json().expect("valid json");
    assert_eq!(body.get("intent").and_then(|v| v.as_str()), Some("unknown"));

    let pending: Vec<uuid::Uuid> = sqlx::query_scalar("SELECT id FROM faqs WHERE approved = false")
        .fetch_all(app.db())
        .await
        .expect("query pending faqs");
    assert_eq!(pending.len(), 1);

    app.cleanup().await.ok();
}
