//! Payment gateway webhook sink (§6, `POST /webhooks/<gateway>`).
//!
//! The `<gateway>` path segment is accepted but not branched on: this
//! backend integrates a single payment gateway, and the segment exists so
//! the gateway's dashboard can be pointed at a conventional webhook URL.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};

use crate::error::{AppError, AppResult};
use crate::models::booking::Booking;
use crate::models::cabin::Cabin;
use crate::services::booking::reconcile_transaction;
use crate::services::payment_gateway::WebhookOutcome;
use crate::state::AppState;

const SIGNATURE_HEADER: &str = "x-webhook-signature";

async fn receive_webhook(
    State(state): State<AppState>,
    Path(_gateway): Path<String>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> AppResult<Json<serde_json::Value>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::InvalidWebhookSignature)?;

    let outcome = state.payment_gateway().verify_and_parse_webhook(&body, signature)?;

    let (payment_ref, succeeded) = match outcome {
        WebhookOutcome::PaymentSucceeded { payment_ref } => (payment_ref, true),
        WebhookOutcome::PaymentFailed { payment_ref, reason } => {
            if let Some(reason) = reason {
                tracing::info!(payment_ref = %payment_ref, reason = %reason, "payment failed per webhook");
            }
            (payment_ref, false)
        },
    };

    // Events unrelated to any known transaction are acknowledged and
    // ignored rather than surfaced as an error — the gateway may notify us
    // about payment refs this deployment never created (test events,
    // refunds on a different integration, ...).
    match reconcile_transaction(state.db(), &payment_ref, succeeded).await {
        Ok(result) => {
            if succeeded {
                dispatch_payment_receipt(&state, result.booking_id, result.amount).await;
            }

            Ok(Json(serde_json::json!({
                "acknowledged": true,
                "booking_id": result.booking_id,
                "status": result.new_status,
            })))
        },
        Err(AppError::NotFound(_)) => {
            tracing::info!(payment_ref = %payment_ref, "webhook event for unknown payment_ref, acknowledged and ignored");
            Ok(Json(serde_json::json!({ "acknowledged": true, "ignored": true })))
        },
        Err(err) => Err(err),
    }
}

/// Best-effort payment receipt dispatch on a successful webhook
/// reconciliation (§4.E "On success → transaction status → completed,
/// receipt email dispatched"). Mirrors the booking-confirmation dispatch in
/// `BookingServiceImpl::create_booking`: failures are logged, never
/// surfaced, since the webhook ack must not depend on SMTP being reachable.
async fn dispatch_payment_receipt(state: &AppState, booking_id: uuid::Uuid, amount: rust_decimal::Decimal) {
    let booking = match sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
        .bind(booking_id)
        .fetch_optional(state.db())
        .await
    {
        Ok(Some(booking)) => booking,
        Ok(None) => return,
        Err(err) => {
            tracing::warn!(error = %err, booking_id = %booking_id, "failed to load booking for payment receipt");
            return;
        },
    };

    let customer_email = match booking.customer_id {
        Some(customer_id) => sqlx::query_scalar::<_, Option<String>>("SELECT email FROM customers WHERE id = $1")
            .bind(customer_id)
            .fetch_optional(state.db())
            .await
            .ok()
            .flatten()
            .flatten(),
        None => None,
    };

    let Some(email) = customer_email else { return };

    let cabin = match sqlx::query_as::<_, Cabin>("SELECT * FROM cabins WHERE id = $1")
        .bind(booking.cabin_id)
        .fetch_optional(state.db())
        .await
    {
        Ok(Some(cabin)) => cabin,
        Ok(None) => return,
        Err(err) => {
            tracing::warn!(error = %err, booking_id = %booking_id, "failed to load cabin for payment receipt");
            return;
        },
    };

    if let Err(err) = state.email().send_payment_receipt(&email, &booking, &cabin, amount).await {
        tracing::warn!(error = %err, booking_id = %booking_id, "payment receipt email failed");
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/webhooks/:gateway", post(receive_webhook))
}
