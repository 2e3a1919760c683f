//! Cabin models
//!
//! A cabin is the bookable unit of inventory. `short_code` is the
//! business-facing identifier guests and the conversational agent use
//! (e.g. "ZB01"); `id` is the internal UUID primary key.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Cabin entity as stored in the relational store.
///
/// `features` is persisted as a JSONB array of lowercase tags but accepted on
/// input in three shapes (comma string, array, key->bool map) via
/// [`CabinFeatures`] so callers don't need to know the canonical form.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cabin {
    pub id: Uuid,
    pub short_code: String,
    pub name: String,
    pub area: Option<String>,
    pub max_adults: i32,
    pub max_kids: i32,
    #[sqlx(json)]
    pub features: Vec<String>,
    pub base_price_per_night: Decimal,
    pub weekend_price_per_night: Option<Decimal>,
    #[sqlx(json)]
    pub image_refs: Vec<String>,
    pub calendar_ref: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Cabin {
    /// The weekend price to use, falling back to the base price when unset or zero.
    pub fn effective_weekend_price(&self) -> Decimal {
        match self.weekend_price_per_night {
            Some(price) if price > Decimal::ZERO => price,
            _ => self.base_price_per_night,
        }
    }

    /// Case-insensitive substring match of a wanted feature against the tag set.
    pub fn has_feature(&self, wanted: &str) -> bool {
        let wanted = wanted.trim().to_lowercase();
        self.features
            .iter()
            .any(|f| f.to_lowercase().contains(&wanted))
    }

    /// Case-insensitive, trimmed equality against the cabin's area.
    pub fn matches_area(&self, area: &str) -> bool {
        self.area
            .as_deref()
            .map(|a| a.trim().eq_ignore_ascii_case(area.trim()))
            .unwrap_or(false)
    }
}

/// Tolerant input wrapper for the `features` field: accepts a comma-separated
/// string, a JSON array of strings, or a key->bool map, and normalizes all
/// three into the canonical `Vec<String>` of lowercase tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CabinFeatures {
    CommaString(String),
    List(Vec<String>),
    Flags(std::collections::HashMap<String, bool>),
}

impl CabinFeatures {
    pub fn into_tags(self) -> Vec<String> {
        let set: BTreeSet<String> = match self {
            CabinFeatures::CommaString(s) => s
                .split(',')
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            CabinFeatures::List(list) => list
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            CabinFeatures::Flags(map) => map
                .into_iter()
                .filter_map(|(k, v)| v.then(|| k.trim().to_lowercase()))
                .filter(|t| !t.is_empty())
                .collect(),
        };
        set.into_iter().collect()
    }
}

/// Create-cabin request DTO (admin surface).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCabinRequest {
    pub short_code: String,
    pub name: String,
    pub area: Option<String>,
    pub max_adults: i32,
    pub max_kids: i32,
    pub features: Option<CabinFeatures>,
    pub base_price_per_night: Decimal,
    pub weekend_price_per_night: Option<Decimal>,
    pub image_refs: Option<Vec<String>>,
    pub calendar_ref: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
}

/// Cabin response DTO. Identical shape to the entity; kept distinct so the
/// wire format can diverge from storage without touching callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CabinResponse {
    pub id: Uuid,
    pub short_code: String,
    pub name: String,
    pub area: Option<String>,
    pub max_adults: i32,
    pub max_kids: i32,
    pub features: Vec<String>,
    pub base_price_per_night: Decimal,
    pub weekend_price_per_night: Option<Decimal>,
    pub image_refs: Vec<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
}

impl From<Cabin> for CabinResponse {
    fn from(c: Cabin) -> Self {
        Self {
            id: c.id,
            short_code: c.short_code,
            name: c.name,
            area: c.area,
            max_adults: c.max_adults,
            max_kids: c.max_kids,
            features: c.features,
            base_price_per_night: c.base_price_per_night,
            weekend_price_per_night: c.weekend_price_per_night,
            image_refs: c.image_refs,
            street: c.street,
            city: c.city,
            postal_code: c.postal_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_string_normalizes_and_dedups() {
        let f = CabinFeatures::CommaString(" Hot Tub, Wifi ,hot tub".to_string());
        let mut tags = f.into_tags();
        tags.sort();
        assert_eq!(tags, vec!["hot tub".to_string(), "wifi".to_string()]);
    }

    #[test]
    fn flags_map_keeps_only_true_entries() {
        let mut map = std::collections::HashMap::new();
        map.insert("wifi".to_string(), true);
        map.insert("pool".to_string(), false);
        let f = CabinFeatures::Flags(map);
        assert_eq!(f.into_tags(), vec!["wifi".to_string()]);
    }

    #[test]
    fn effective_weekend_price_falls_back_to_base() {
        let cabin = Cabin {
            id: Uuid::new_v4(),
            short_code: "ZB01".to_string(),
            name: "Test".to_string(),
            area: None,
            max_adults: 2,
            max_kids: 0,
            features: vec![],
            base_price_per_night: Decimal::from(500),
            weekend_price_per_night: Some(Decimal::ZERO),
            image_refs: vec![],
            calendar_ref: None,
            street: None,
            city: None,
            postal_code: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert_eq!(cabin.effective_weekend_price(), Decimal::from(500));
    }
}
