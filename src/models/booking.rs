//! Booking models
//!
//! A booking represents a confirmed (or cancelled) stay. Holds are ephemeral
//! and live in the lock store, not here — see [`crate::models::hold::Hold`].

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Hold,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub cabin_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub adults: i32,
    pub kids: i32,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub calendar_event_ref: Option<String>,
    pub calendar_event_link: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }

    /// Half-open interval overlap test: `a.start < b.end && b.start < a.end`.
    pub fn overlaps(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.check_in_date < check_out && check_in < self.check_out_date
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.status, BookingStatus::Cancelled)
    }
}

/// Request to create a booking directly (bypassing the agent), used by
/// `POST /book`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    /// Short-code, UUID, name, or calendar ref — resolved per §4.E step 1.
    pub cabin: String,
    pub check_in: String,
    pub check_out: String,
    pub adults: i32,
    pub kids: i32,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub hold_id: Option<String>,
    pub total_price: Option<Decimal>,
    pub notes: Option<String>,
    #[serde(default = "default_true")]
    pub create_payment: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub cabin_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub nights: i64,
    pub adults: i32,
    pub kids: i32,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub calendar_event_ref: Option<String>,
    pub calendar_event_link: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Present only when payment creation failed but the booking still
    /// committed (§4.E step 5 failure semantics).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        let nights = b.nights();
        Self {
            id: b.id,
            cabin_id: b.cabin_id,
            customer_id: b.customer_id,
            check_in_date: b.check_in_date,
            check_out_date: b.check_out_date,
            nights,
            adults: b.adults,
            kids: b.kids,
            total_price: b.total_price,
            status: b.status,
            calendar_event_ref: b.calendar_event_ref,
            calendar_event_link: b.calendar_event_link,
            notes: b.notes,
            created_at: b.created_at,
            warning: None,
        }
    }
}

/// Admin listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingListFilter {
    pub status: Option<BookingStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(check_in: &str, check_out: &str) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            cabin_id: Uuid::new_v4(),
            customer_id: None,
            check_in_date: check_in.parse().unwrap(),
            check_out_date: check_out.parse().unwrap(),
            adults: 2,
            kids: 0,
            total_price: Decimal::from(1000),
            status: BookingStatus::Confirmed,
            calendar_event_ref: None,
            calendar_event_link: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn abutting_ranges_do_not_overlap() {
        let b = booking("2026-03-10", "2026-03-12");
        assert!(!b.overlaps(
            "2026-03-12".parse().unwrap(),
            "2026-03-14".parse().unwrap()
        ));
    }

    #[test]
    fn overlapping_ranges_conflict() {
        let b = booking("2026-03-10", "2026-03-12");
        assert!(b.overlaps(
            "2026-03-11".parse().unwrap(),
            "2026-03-13".parse().unwrap()
        ));
    }

    #[test]
    fn nights_counts_half_open_days() {
        let b = booking("2026-02-01", "2026-02-03");
        assert_eq!(b.nights(), 2);
    }
}
