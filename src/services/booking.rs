//! Booking commit service
//!
//! Orchestrates the end-to-end reservation commit: cabin resolution, hold
//! validation, calendar availability, calendar event creation, pricing,
//! persistence, payment intent creation, auditing, and hold conversion.
//! Structured as the teacher's `XService` trait + `XServiceImpl` pair
//! (`services::loyalty::LoyaltyService`/`LoyaltyServiceImpl`), with the
//! commit steps themselves grounded on `examples/original_source/src/db.py`'s
//! booking-insert flow (customer upsert before booking insert) and
//! `examples/original_source/src/hold.py`'s hold-then-convert lifecycle.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, AppResult, OptionExt};
use crate::models::audit::AuditAction;
use crate::models::booking::{Booking, BookingListFilter, BookingResponse, BookingStatus, CreateBookingRequest};
use crate::models::cabin::Cabin;
use crate::models::customer::{Customer, UpsertCustomerRequest};
use crate::models::transaction::{Transaction, TransactionStatus};
use crate::services::audit::AuditService;
use crate::services::calendar_gateway::{CalendarGatewayService, NewEventDetails};
use crate::services::email::EmailService;
use crate::services::hold_manager::HoldManager;
use crate::services::payment_gateway::PaymentGatewayService;
use crate::services::pricing::{Addon, PricingEngine};

#[async_trait]
pub trait BookingService: Send + Sync {
    async fn create_booking(&self, request: CreateBookingRequest) -> AppResult<BookingResponse>;
    async fn cancel_booking(&self, id: Uuid) -> AppResult<()>;
    async fn get_booking(&self, id: Uuid) -> AppResult<BookingResponse>;
    async fn list_bookings(&self, filter: BookingListFilter) -> AppResult<Vec<BookingResponse>>;
}

pub struct BookingServiceImpl {
    pool: PgPool,
    calendar: Arc<dyn CalendarGatewayService>,
    payment: Arc<dyn PaymentGatewayService>,
    pricing: PricingEngine,
    hold_manager: Arc<Mutex<HoldManager>>,
    email: Arc<dyn EmailService>,
}

impl BookingServiceImpl {
    pub fn new(
        pool: PgPool,
        calendar: Arc<dyn CalendarGatewayService>,
        payment: Arc<dyn PaymentGatewayService>,
        pricing: PricingEngine,
        hold_manager: Arc<Mutex<HoldManager>>,
        email: Arc<dyn EmailService>,
    ) -> Self {
        Self {
            pool,
            calendar,
            payment,
            pricing,
            hold_manager,
            email,
        }
    }

    /// §4.E step 1: try short_code, then id, then name, then a trailing match
    /// on calendar_ref.
    async fn resolve_cabin(&self, identifier: &str) -> AppResult<Cabin> {
        if let Some(cabin) = sqlx::query_as::<_, Cabin>("SELECT * FROM cabins WHERE short_code = $1")
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(cabin);
        }

        if let Ok(id) = Uuid::parse_str(identifier) {
            if let Some(cabin) = sqlx::query_as::<_, Cabin>("SELECT * FROM cabins WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
            {
                return Ok(cabin);
            }
        }

        if let Some(cabin) = sqlx::query_as::<_, Cabin>("SELECT * FROM cabins WHERE name = $1")
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(cabin);
        }

        if let Some(cabin) =
            sqlx::query_as::<_, Cabin>("SELECT * FROM cabins WHERE calendar_ref LIKE '%' || $1")
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?
        {
            return Ok(cabin);
        }

        Err(AppError::CabinNotFound(identifier.to_string()))
    }

    async fn upsert_customer(&self, req: &UpsertCustomerRequest) -> AppResult<Option<Customer>> {
        if !req.is_valid() {
            return Ok(None);
        }

        if let Some(email) = req.email.as_deref().filter(|e| !e.trim().is_empty()) {
            if let Some(existing) = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?
            {
                return Ok(Some(existing));
            }
        } else if let Some(phone) = req.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            if let Some(existing) = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE phone = $1")
                .bind(phone)
                .fetch_optional(&self.pool)
                .await?
            {
                return Ok(Some(existing));
            }
        }

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, email, phone)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.email)
        .bind(&req.phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(Some(customer))
    }

    fn parse_date(value: &str, field: &str) -> AppResult<NaiveDate> {
        crate::utils::dates::parse_flexible_date(value, field)
    }

    /// §3 Booking capacity invariant (`adults ≤ cabin.maxAdults`,
    /// `kids ≤ cabin.maxKids`) plus the §7 `InvalidInput` "negative party
    /// size" case.
    fn validate_party_size(cabin: &Cabin, adults: i32, kids: i32) -> AppResult<()> {
        if adults < 0 || kids < 0 {
            return Err(AppError::InvalidInput("adults and kids must not be negative".to_string()));
        }
        if adults > cabin.max_adults {
            return Err(AppError::InvalidInput(format!(
                "{adults} adults exceeds {}'s capacity of {}",
                cabin.short_code, cabin.max_adults
            )));
        }
        if kids > cabin.max_kids {
            return Err(AppError::InvalidInput(format!(
                "{kids} kids exceeds {}'s capacity of {}",
                cabin.short_code, cabin.max_kids
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl BookingService for BookingServiceImpl {
    async fn create_booking(&self, request: CreateBookingRequest) -> AppResult<BookingResponse> {
        // --- Preconditions (fail-fast, in order) ---
        let cabin = self.resolve_cabin(&request.cabin).await?;
        Self::validate_party_size(&cabin, request.adults, request.kids)?;

        let check_in = Self::parse_date(&request.check_in, "check_in")?;
        let check_out = Self::parse_date(&request.check_out, "check_out")?;
        if check_out <= check_in {
            return Err(AppError::InvalidInput("check_out must be after check_in".to_string()));
        }

        let check_in_utc = check_in.and_hms_opt(0, 0, 0).expect("valid time").and_utc();
        let check_out_utc = check_out.and_hms_opt(0, 0, 0).expect("valid time").and_utc();

        let mut hold_manager = self.hold_manager.lock().await;
        let hold_id = match &request.hold_id {
            Some(raw_id) => {
                let hold_id = Uuid::parse_str(raw_id)
                    .map_err(|_| AppError::InvalidFormat("hold_id must be a UUID".to_string()))?;
                let hold = hold_manager
                    .get_hold_for_commit(hold_id, &cabin.short_code, check_in, check_out)
                    .await?;
                Some(hold.id)
            },
            None => {
                if hold_manager.check_hold_exists(&cabin.short_code, check_in, check_out).await {
                    return Err(AppError::CabinOnHold {
                        cabin: cabin.short_code.clone(),
                        check_in: check_in.to_string(),
                        check_out: check_out.to_string(),
                    });
                }
                None
            },
        };
        drop(hold_manager);

        let calendar_ref = cabin
            .calendar_ref
            .as_deref()
            .ok_or_else(|| AppError::CabinNotFound(cabin.short_code.clone()))?;
        let events = self
            .calendar
            .list_events(calendar_ref, check_in_utc, check_out_utc)
            .await?;
        if events.iter().any(|e| e.overlaps(check_in_utc, check_out_utc)) {
            return Err(AppError::CabinBusy {
                cabin: cabin.short_code.clone(),
                check_in: check_in.to_string(),
                check_out: check_out.to_string(),
            });
        }

        // --- Commit steps ---
        let customer = self
            .upsert_customer(&UpsertCustomerRequest {
                name: request.customer_name.clone(),
                email: request.customer_email.clone(),
                phone: request.customer_phone.clone(),
            })
            .await?;

        let event_details = NewEventDetails {
            cabin_short_code: cabin.short_code.clone(),
            customer_name: request.customer_name.clone().unwrap_or_else(|| "Guest".to_string()),
            customer_phone: request.customer_phone.clone(),
            check_in: check_in_utc,
            check_out: check_out_utc,
            notes: request.notes.clone(),
        };
        let (calendar_event_ref, calendar_event_link) =
            self.calendar.insert_event(calendar_ref, &event_details).await?;

        let total_price = match request.total_price {
            Some(price) => price,
            None => {
                let breakdown = self.pricing.calculate_price_breakdown(
                    &cabin,
                    check_in,
                    check_out,
                    &[] as &[Addon],
                    true,
                );
                breakdown.total
            },
        };

        let booking_insert_result = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings
                (cabin_id, customer_id, check_in_date, check_out_date, adults, kids,
                 total_price, status, calendar_event_ref, calendar_event_link, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'confirmed', $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(cabin.id)
        .bind(customer.as_ref().map(|c| c.id))
        .bind(check_in)
        .bind(check_out)
        .bind(request.adults)
        .bind(request.kids)
        .bind(total_price)
        .bind(&calendar_event_ref)
        .bind(&calendar_event_link)
        .bind(&request.notes)
        .fetch_one(&self.pool)
        .await;

        let booking = match booking_insert_result {
            Ok(booking) => booking,
            Err(err) => {
                // Step 2 succeeded but step 4 failed: the calendar event is
                // orphaned. Best-effort compensate by deleting it immediately
                // rather than leaving a dangling external reservation.
                if let Err(cleanup_err) = self.calendar.delete_event(calendar_ref, &calendar_event_ref).await {
                    tracing::error!(
                        error = %cleanup_err,
                        event_ref = %calendar_event_ref,
                        "failed to compensate orphaned calendar event after booking insert failure"
                    );
                }
                return Err(err.into());
            },
        };

        let audit = AuditService::new(&self.pool);
        if let Err(err) = audit
            .record_insert(
                "bookings",
                &booking.id.to_string(),
                serde_json::to_value(&booking).unwrap_or(serde_json::Value::Null),
            )
            .await
        {
            tracing::error!(error = %err, booking_id = %booking.id, "failed to write audit entry for booking insert");
        }

        let mut warning = None;

        if request.create_payment && total_price > Decimal::ZERO {
            match self
                .payment
                .create_payment_intent(total_price, "ils", &booking.id.to_string(), None)
                .await
            {
                Ok(intent) => {
                    let transaction_result = sqlx::query_as::<_, Transaction>(
                        r#"
                        INSERT INTO transactions (booking_id, payment_ref, amount, currency, status)
                        VALUES ($1, $2, $3, $4, 'pending')
                        RETURNING *
                        "#,
                    )
                    .bind(booking.id)
                    .bind(&intent.payment_ref)
                    .bind(total_price)
                    .bind(&intent.currency.to_uppercase())
                    .fetch_one(&self.pool)
                    .await;

                    if let Err(err) = transaction_result {
                        tracing::error!(error = %err, booking_id = %booking.id, "failed to persist pending transaction");
                        warning = Some("payment intent created but transaction record failed to save".to_string());
                    }
                },
                Err(err) => {
                    tracing::error!(error = %err, booking_id = %booking.id, "payment intent creation failed");
                    warning = Some(format!("booking confirmed but payment setup failed: {err}"));
                },
            }
        }

        if let Some(hold_id) = hold_id {
            let mut hold_manager = self.hold_manager.lock().await;
            if !hold_manager.convert_hold_to_booking(hold_id, booking.id).await {
                tracing::warn!(hold_id = %hold_id, booking_id = %booking.id, "hold conversion failed, hold will expire naturally");
            }
        }

        if let Some(customer) = &customer {
            if let Some(email) = &customer.email {
                if let Err(err) = self.email.send_booking_confirmation(email, &booking, &cabin).await {
                    tracing::warn!(error = %err, booking_id = %booking.id, "booking confirmation email failed");
                }
            }
        }

        let mut response: BookingResponse = booking.into();
        response.warning = warning;
        Ok(response)
    }

    async fn cancel_booking(&self, id: Uuid) -> AppResult<()> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_not_found("booking")?;

        let old_values = serde_json::to_value(&booking).unwrap_or(serde_json::Value::Null);

        sqlx::query("UPDATE bookings SET status = 'cancelled', updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let audit = AuditService::new(&self.pool);
        let mut new_values = old_values.clone();
        new_values["status"] = serde_json::Value::String("cancelled".to_string());
        if let Err(err) = audit
            .record_update("bookings", &id.to_string(), old_values, new_values)
            .await
        {
            tracing::error!(error = %err, booking_id = %id, "failed to write audit entry for booking cancellation");
        }

        if let (Some(calendar_ref), Some(event_ref)) = (
            sqlx::query_scalar::<_, Option<String>>("SELECT calendar_ref FROM cabins WHERE id = $1")
                .bind(booking.cabin_id)
                .fetch_one(&self.pool)
                .await
                .ok()
                .flatten(),
            booking.calendar_event_ref.clone(),
        ) {
            if let Err(err) = self.calendar.delete_event(&calendar_ref, &event_ref).await {
                tracing::warn!(error = %err, booking_id = %id, "best-effort calendar event deletion failed on cancellation");
            }
        }

        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> AppResult<BookingResponse> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_not_found("booking")?;

        Ok(booking.into())
    }

    async fn list_bookings(&self, filter: BookingListFilter) -> AppResult<Vec<BookingResponse>> {
        let bookings = match filter.status {
            Some(status) => {
                sqlx::query_as::<_, Booking>(
                    "SELECT * FROM bookings WHERE status = $1 ORDER BY check_in_date DESC",
                )
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            },
            None => {
                sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY check_in_date DESC")
                    .fetch_all(&self.pool)
                    .await?
            },
        };

        Ok(bookings.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookReconciliationResult {
    pub booking_id: Uuid,
    pub new_status: TransactionStatus,
    pub amount: Decimal,
}

/// Matches a payment gateway webhook event to a transaction by `paymentRef`
/// and reconciles status per §4.E. Kept free of `BookingService` since it
/// operates on transactions, not bookings, and doesn't need the calendar or
/// pricing dependencies.
pub async fn reconcile_transaction(
    pool: &PgPool,
    payment_ref: &str,
    succeeded: bool,
) -> AppResult<WebhookReconciliationResult> {
    let transaction = sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE payment_ref = $1")
        .bind(payment_ref)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("transaction with payment_ref {payment_ref}")))?;

    let new_status = if succeeded {
        TransactionStatus::Completed
    } else {
        TransactionStatus::Failed
    };

    sqlx::query("UPDATE transactions SET status = $1, updated_at = now() WHERE id = $2")
        .bind(new_status)
        .bind(transaction.id)
        .execute(pool)
        .await?;

    Ok(WebhookReconciliationResult {
        booking_id: transaction.booking_id,
        new_status,
        amount: transaction.amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_out_before_check_in_is_rejected_shape() {
        let check_in: NaiveDate = "2026-03-12".parse().unwrap();
        let check_out: NaiveDate = "2026-03-10".parse().unwrap();
        assert!(check_out <= check_in);
    }

    #[test]
    fn parse_date_rejects_garbage() {
        let result = BookingServiceImpl::parse_date("not-a-date", "check_in");
        assert!(result.is_err());
    }

    #[test]
    fn parse_date_accepts_iso_format() {
        let result = BookingServiceImpl::parse_date("2026-03-10", "check_in").unwrap();
        assert_eq!(result.to_string(), "2026-03-10");
    }

    fn cabin() -> Cabin {
        Cabin {
            id: Uuid::new_v4(),
            short_code: "ZB01".to_string(),
            name: "Zimmer Bayit".to_string(),
            area: None,
            max_adults: 2,
            max_kids: 1,
            features: vec![],
            base_price_per_night: Decimal::from(500),
            weekend_price_per_night: None,
            image_refs: vec![],
            calendar_ref: Some("cal-zb01".to_string()),
            street: None,
            city: None,
            postal_code: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn validate_party_size_rejects_negative_adults() {
        let result = BookingServiceImpl::validate_party_size(&cabin(), -1, 0);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn validate_party_size_rejects_negative_kids() {
        let result = BookingServiceImpl::validate_party_size(&cabin(), 1, -1);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn validate_party_size_rejects_adults_over_capacity() {
        let result = BookingServiceImpl::validate_party_size(&cabin(), 3, 0);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn validate_party_size_rejects_kids_over_capacity() {
        let result = BookingServiceImpl::validate_party_size(&cabin(), 2, 2);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn validate_party_size_accepts_within_capacity() {
        let result = BookingServiceImpl::validate_party_size(&cabin(), 2, 1);
        assert!(result.is_ok());
    }
}
