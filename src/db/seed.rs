//! Database seeding module
//!
//! This module provides functions for seeding the database with essential
//! and sample data. Essential data is seeded in all environments, while
//! sample data is only seeded in development.

use anyhow::{Context, Result};
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};

/// A structured business fact the agent quotes verbatim instead of
/// improvising (check-in times, pet policy, parking, etc).
struct SeedFact {
    key: &'static str,
    value: &'static str,
    category: &'static str,
    description: &'static str,
}

/// Facts that must exist for the agent to answer common questions
/// consistently. These are reinserted on every startup in all environments.
fn get_essential_facts() -> Vec<SeedFact> {
    vec![
        SeedFact {
            key: "check_in_time",
            value: "15:00",
            category: "policy",
            description: "Standard check-in time",
        },
        SeedFact {
            key: "check_out_time",
            value: "11:00",
            category: "policy",
            description: "Standard check-out time",
        },
        SeedFact {
            key: "cancellation_policy",
            value: "Free cancellation up to 7 days before check-in. Cancellations within 7 days forfeit the deposit.",
            category: "policy",
            description: "Cancellation and refund terms",
        },
        SeedFact {
            key: "pet_policy",
            value: "Pets are welcome in select cabins for an additional cleaning fee; please mention your pet when booking.",
            category: "policy",
            description: "Pet policy for cabin stays",
        },
        SeedFact {
            key: "parking",
            value: "Free private parking is available on-site at every cabin.",
            category: "amenities",
            description: "Parking availability",
        },
        SeedFact {
            key: "wifi",
            value: "Free wifi is included in all cabins.",
            category: "amenities",
            description: "Wifi availability",
        },
        SeedFact {
            key: "kosher",
            value: "Kitchens are equipped but not certified kosher; kosher-keeping guests are welcome to bring their own utensils.",
            category: "amenities",
            description: "Kashrut status of cabin kitchens",
        },
    ]
}

/// Sample cabins seeded for local development and demos.
struct SeedCabin {
    short_code: &'static str,
    name: &'static str,
    area: &'static str,
    max_adults: i32,
    max_kids: i32,
    features: serde_json::Value,
    base_price_per_night: &'static str,
    weekend_price_per_night: Option<&'static str>,
    calendar_ref: &'static str,
}

fn get_sample_cabins() -> Vec<SeedCabin> {
    vec![
        SeedCabin {
            short_code: "ZB01",
            name: "Zimmer Bereshit 1 - Forest View",
            area: "Galilee",
            max_adults: 2,
            max_kids: 2,
            features: json!(["jacuzzi", "fireplace", "kitchenette", "private_deck"]),
            base_price_per_night: "650.00",
            weekend_price_per_night: Some("850.00"),
            calendar_ref: "zb01@cabins.example.test",
        },
        SeedCabin {
            short_code: "ZB02",
            name: "Zimmer Bereshit 2 - Vineyard Suite",
            area: "Galilee",
            max_adults: 2,
            max_kids: 0,
            features: json!(["jacuzzi", "kitchenette", "pet_friendly"]),
            base_price_per_night: "600.00",
            weekend_price_per_night: Some("780.00"),
            calendar_ref: "zb02@cabins.example.test",
        },
        SeedCabin {
            short_code: "ZB03",
            name: "Zimmer Bereshit 3 - Family Lodge",
            area: "Galilee",
            max_adults: 4,
            max_kids: 3,
            features: json!(["fireplace", "full_kitchen", "two_bedrooms", "pet_friendly"]),
            base_price_per_night: "900.00",
            weekend_price_per_night: Some("1150.00"),
            calendar_ref: "zb03@cabins.example.test",
        },
        SeedCabin {
            short_code: "ZB04",
            name: "Zimmer Bereshit 4 - Orchard Cottage",
            area: "Galilee",
            max_adults: 2,
            max_kids: 1,
            features: json!(["jacuzzi", "kitchenette", "private_garden"]),
            base_price_per_night: "620.00",
            weekend_price_per_night: None,
            calendar_ref: "zb04@cabins.example.test",
        },
    ]
}

/// Seed essential data required for the application to function.
///
/// This function seeds the structured business facts the agent relies on
/// to answer policy/amenity questions. This should be called on every
/// startup in ALL environments.
pub async fn seed_essential_data(db: &PgPool) -> Result<()> {
    info!("Starting essential data seeding...");

    seed_business_facts(db).await?;

    info!("Essential data seeding completed");
    Ok(())
}

/// Seed sample data for development/testing.
///
/// This function seeds a handful of sample cabins so the catalog and
/// booking flows have something to operate against locally. This should
/// only be called in development environments.
pub async fn seed_sample_data(db: &PgPool) -> Result<()> {
    info!("Starting sample data seeding (development only)...");

    seed_cabins(db).await?;

    info!("Sample data seeding completed");
    Ok(())
}

async fn seed_business_facts(db: &PgPool) -> Result<()> {
    info!("Checking business_facts...");

    let table_exists: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = 'business_facts'
        )
        "#,
    )
    .fetch_one(db)
    .await
    .context("Failed to check if business_facts table exists")?;

    if !table_exists.0 {
        warn!("business_facts table does not exist, skipping seeding");
        return Ok(());
    }

    for fact in get_essential_facts() {
        sqlx::query!(
            r#"
            INSERT INTO business_facts (fact_key, fact_value, category, description, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, true, NOW(), NOW())
            ON CONFLICT (fact_key) DO NOTHING
            "#,
            fact.key,
            fact.value,
            fact.category,
            fact.description,
        )
        .execute(db)
        .await
        .context(format!("Failed to insert business fact {}", fact.key))?;
    }

    info!("Seeded: {} business facts", get_essential_facts().len());
    Ok(())
}

async fn seed_cabins(db: &PgPool) -> Result<()> {
    info!("Checking cabins...");

    let table_exists: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = 'cabins'
        )
        "#,
    )
    .fetch_one(db)
    .await
    .context("Failed to check if cabins table exists")?;

    if !table_exists.0 {
        warn!("cabins table does not exist, skipping seeding");
        return Ok(());
    }

    for cabin in get_sample_cabins() {
        let existing: Option<uuid::Uuid> =
            sqlx::query_scalar!("SELECT id FROM cabins WHERE short_code = $1", cabin.short_code)
                .fetch_optional(db)
                .await
                .context("Failed to check existing cabin")?;

        if existing.is_some() {
            info!("Cabin {} already exists, skipping", cabin.short_code);
            continue;
        }

        let base_price: rust_decimal::Decimal = cabin.base_price_per_night.parse()?;
        let weekend_price: Option<rust_decimal::Decimal> =
            cabin.weekend_price_per_night.map(|p| p.parse()).transpose()?;

        sqlx::query!(
            r#"
            INSERT INTO cabins (
                short_code, name, area, max_adults, max_kids, features,
                base_price_per_night, weekend_price_per_night, calendar_ref,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())
            "#,
            cabin.short_code,
            cabin.name,
            cabin.area,
            cabin.max_adults,
            cabin.max_kids,
            cabin.features,
            base_price,
            weekend_price,
            cabin.calendar_ref,
        )
        .execute(db)
        .await
        .context(format!("Failed to insert cabin {}", cabin.short_code))?;

        info!("Seeded: cabin {} ({})", cabin.short_code, cabin.name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_essential_facts_have_unique_keys() {
        let facts = get_essential_facts();
        let mut keys: Vec<&str> = facts.iter().map(|f| f.key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), facts.len(), "fact keys must be unique");
    }

    #[test]
    fn test_essential_facts_nonempty_values() {
        for fact in get_essential_facts() {
            assert!(!fact.value.is_empty());
        }
    }

    #[test]
    fn test_sample_cabins_unique_short_codes() {
        let cabins = get_sample_cabins();
        let mut codes: Vec<&str> = cabins.iter().map(|c| c.short_code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), cabins.len(), "cabin short codes must be unique");
    }

    #[test]
    fn test_sample_cabins_prices_parse() {
        for cabin in get_sample_cabins() {
            let price: rust_decimal::Decimal = cabin.base_price_per_night.parse().unwrap();
            assert!(price > rust_decimal::Decimal::ZERO);
        }
    }
}
