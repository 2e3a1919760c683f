//! FAQ and business-fact knowledge base models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Faq {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub approved: bool,
    pub suggested_answer: Option<String>,
    pub suggested_by: Option<Uuid>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub usage_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqResponse {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub approved: bool,
    pub usage_count: i64,
}

impl From<Faq> for FaqResponse {
    fn from(f: Faq) -> Self {
        Self {
            id: f.id,
            question: f.question,
            answer: f.answer,
            approved: f.approved,
            usage_count: f.usage_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestFaqRequest {
    pub question: String,
    pub suggested_answer: String,
    pub suggested_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveFaqRequest {
    pub id: Uuid,
    pub approve: bool,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub approved_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateFaqRequest {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub approved: Option<bool>,
}

/// A host-curated key->value pair answering a fixed set of common questions
/// (check-in time, pet policy, parking, ...).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BusinessFact {
    pub fact_key: String,
    pub fact_value: String,
    pub category: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertBusinessFactRequest {
    pub fact_key: String,
    pub fact_value: String,
    pub category: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
