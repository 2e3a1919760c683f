//! Hold models
//!
//! Holds are ephemeral records that live in the lock store (Redis), never in
//! PostgreSQL. See [`crate::services::hold_manager`] for the atomic
//! create/release/convert operations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldStatus {
    Active,
    Converted,
    Released,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hold {
    pub id: Uuid,
    pub cabin_id: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub customer_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub status: HoldStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Hold {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// The composite primary key used in the lock store: `hold:{cabin}:{in}:{out}`.
    pub fn primary_key(cabin_id: &str, check_in: NaiveDate, check_out: NaiveDate) -> String {
        format!("hold:{}:{}:{}", cabin_id, check_in, check_out)
    }

    /// The secondary key pointing back at the primary key: `hold:by-id:{id}`.
    pub fn by_id_key(id: Uuid) -> String {
        format!("hold:by-id:{}", id)
    }

    /// Diagnostic marker recorded on conversion, TTL 24h: `hold:converted:{id}`.
    pub fn converted_marker_key(id: Uuid) -> String {
        format!("hold:converted:{}", id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHoldRequest {
    pub cabin: String,
    pub check_in: String,
    pub check_out: String,
    pub customer_name: Option<String>,
    pub customer_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldResponse {
    pub id: Uuid,
    pub cabin_id: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub status: HoldStatus,
    pub expires_at: DateTime<Utc>,
    /// Set when the lock store is unreachable and the hold was created in the
    /// in-process fallback map instead — not safe for multi-instance deployment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<Hold> for HoldResponse {
    fn from(h: Hold) -> Self {
        Self {
            id: h.id,
            cabin_id: h.cabin_id,
            check_in_date: h.check_in_date,
            check_out_date: h.check_out_date,
            status: h.status,
            expires_at: h.expires_at,
            warning: None,
        }
    }
}
