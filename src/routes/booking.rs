//! Direct booking commit route and its admin-facing counterparts (§4.E).
//!
//! Thin handlers over `services::booking::BookingService`; all of the actual
//! commit logic (hold validation, calendar re-check, persistence, payment
//! intent, audit, hold conversion) lives there. Structured the way
//! `routes::cabins`/`routes::hold` shape their handlers.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::booking::{BookingListFilter, BookingResponse, CreateBookingRequest};
use crate::models::transaction::{Transaction, TransactionResponse};
use crate::state::AppState;

async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> AppResult<Json<BookingResponse>> {
    let response = state.booking().create_booking(request).await?;
    Ok(Json(response))
}

async fn cancel_booking(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<serde_json::Value>> {
    state.booking().cancel_booking(id).await?;
    Ok(Json(serde_json::json!({ "cancelled": true })))
}

#[derive(Debug, Deserialize)]
struct ListBookingsQuery {
    status: Option<crate::models::booking::BookingStatus>,
}

async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<ListBookingsQuery>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let filter = BookingListFilter { status: query.status };
    let bookings = state.booking().list_bookings(filter).await?;
    Ok(Json(bookings))
}

#[derive(Debug, serde::Serialize)]
struct BookingDetailResponse {
    #[serde(flatten)]
    booking: BookingResponse,
    transactions: Vec<TransactionResponse>,
}

async fn get_booking(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<BookingDetailResponse>> {
    let booking = state.booking().get_booking(id).await?;
    let transactions = fetch_transactions(state.db(), id).await?;
    Ok(Json(BookingDetailResponse { booking, transactions }))
}

async fn fetch_transactions(pool: &PgPool, booking_id: Uuid) -> AppResult<Vec<TransactionResponse>> {
    let rows = sqlx::query_as::<_, Transaction>(
        "SELECT * FROM transactions WHERE booking_id = $1 ORDER BY created_at ASC",
    )
    .bind(booking_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// The public direct-booking-commit endpoint (§4.E), unauthenticated like
/// the rest of the customer-facing surface.
pub fn routes() -> Router<AppState> {
    Router::new().route("/book", post(create_booking))
}

/// Admin-only booking listing/detail/cancellation, merged under
/// [`crate::middleware::admin_middleware`] by `routes::create_router`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/bookings", get(list_bookings))
        .route("/admin/bookings/:id", get(get_booking))
        .route("/admin/bookings/:id/cancel", post(cancel_booking))
}
