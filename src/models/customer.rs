//! Customer models
//!
//! Customers are deduplicated on non-empty email first, then non-empty phone.
//! At least one of (name, email, phone) is required on first insert.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Input for upserting a customer during a booking or hold. At least one field
/// must be present; enforced by [`UpsertCustomerRequest::is_valid`], not serde.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl UpsertCustomerRequest {
    pub fn is_valid(&self) -> bool {
        self.name.as_deref().is_some_and(|s| !s.trim().is_empty())
            || self.email.as_deref().is_some_and(|s| !s.trim().is_empty())
            || self.phone.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_at_least_one_identifying_field() {
        assert!(!UpsertCustomerRequest::default().is_valid());
        assert!(UpsertCustomerRequest {
            phone: Some("0501234567".to_string()),
            ..Default::default()
        }
        .is_valid());
    }

    #[test]
    fn blank_strings_do_not_count() {
        let req = UpsertCustomerRequest {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!req.is_valid());
    }
}
