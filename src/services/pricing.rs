//! Pricing engine
//!
//! Deterministic per-night price decomposition with weekend/holiday/season
//! surcharges and long-stay discounts. All arithmetic is done in
//! `rust_decimal::Decimal` — never `f64` — so totals are exact to the cent.
//!
//! Grounded on `examples/original_source/src/pricing.py`
//! (`PricingEngine.calculate_price_breakdown`); the holiday/season tables are
//! externalized to [`PricingConfig`] instead of being hard-coded for a single
//! year, per the holiday-table Open Question in `SPEC_FULL.md` §9.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::cabin::Cabin;

/// A single add-on line item (e.g. "extra bed", "late checkout").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Addon {
    pub name: String,
    pub price: Decimal,
}

/// One night's contribution to the breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightBreakdown {
    pub date: NaiveDate,
    pub is_weekend: bool,
    pub is_holiday: bool,
    pub is_high_season: bool,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountInfo {
    pub percent: Decimal,
    pub amount: Decimal,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub nights: i64,
    pub regular_nights: i64,
    pub weekend_nights: i64,
    pub holiday_nights: i64,
    pub high_season_nights: i64,
    pub base_total: Decimal,
    pub weekend_surcharge: Decimal,
    pub holiday_surcharge: Decimal,
    pub high_season_surcharge: Decimal,
    pub addons_total: Decimal,
    pub addons: Vec<Addon>,
    pub subtotal: Decimal,
    pub discount: DiscountInfo,
    pub total: Decimal,
    pub breakdown: Vec<NightBreakdown>,
}

/// Configurable holiday/season tables. Defaults match the 2026 Israeli
/// calendar used by the source system; a real deployment would load these
/// from the database or configuration so business staff can edit without a
/// code change (see `SPEC_FULL.md` §9 "Holiday table").
#[derive(Debug, Clone)]
pub struct PricingConfig {
    pub holidays: Vec<NaiveDate>,
    pub high_season_months: Vec<u32>,
    pub holiday_season_months: Vec<u32>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            holidays: default_holidays_2026(),
            high_season_months: vec![7, 8],
            holiday_season_months: vec![4, 9, 10],
        }
    }
}

fn default_holidays_2026() -> Vec<NaiveDate> {
    let d = |m: u32, day: u32| NaiveDate::from_ymd_opt(2026, m, day).expect("valid calendar date");
    vec![
        d(4, 22),
        d(4, 23),
        d(4, 24),
        d(4, 28),
        d(4, 29),
        d(5, 14),
        d(6, 11),
        d(9, 15),
        d(9, 16),
        d(9, 24),
        d(9, 29),
        d(9, 30),
        d(10, 1),
        d(10, 6),
        d(10, 7),
    ]
}

/// Deterministic price calculator. Stateless aside from its (cheaply cloned)
/// configuration table.
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn is_weekend(&self, d: NaiveDate) -> bool {
        matches!(d.weekday(), Weekday::Fri | Weekday::Sat)
    }

    pub fn is_holiday(&self, d: NaiveDate) -> bool {
        self.config.holidays.contains(&d)
    }

    pub fn is_high_season(&self, d: NaiveDate) -> bool {
        self.config.high_season_months.contains(&d.month())
    }

    pub fn is_holiday_season(&self, d: NaiveDate) -> bool {
        self.config.holiday_season_months.contains(&d.month())
    }

    pub fn calculate_nights(&self, check_in: NaiveDate, check_out: NaiveDate) -> i64 {
        (check_out - check_in).num_days().max(0)
    }

    /// Long-stay discount tier, applied to the full subtotal (base + add-ons).
    pub fn calculate_discount(&self, nights: i64, subtotal: Decimal) -> DiscountInfo {
        let (percent, reason): (Decimal, Option<&str>) = if nights >= 30 {
            (Decimal::from(15), Some("Long-stay discount (month)"))
        } else if nights >= 14 {
            (Decimal::from(12), Some("Long-stay discount (two weeks)"))
        } else if nights >= 7 {
            (Decimal::from(10), Some("Long-stay discount (week)"))
        } else if nights >= 4 {
            (Decimal::from(5), Some("Long-stay discount (4+ nights)"))
        } else {
            (Decimal::ZERO, None)
        };

        let amount = if percent > Decimal::ZERO {
            round2(subtotal * percent / Decimal::from(100))
        } else {
            Decimal::ZERO
        };

        DiscountInfo {
            percent,
            amount,
            reason: reason.map(str::to_string),
        }
    }

    /// Full breakdown for a stay. `check_in`/`check_out` are business-local
    /// calendar dates (already resolved from wall-clock input upstream).
    pub fn calculate_price_breakdown(
        &self,
        cabin: &Cabin,
        check_in: NaiveDate,
        check_out: NaiveDate,
        addons: &[Addon],
        apply_discounts: bool,
    ) -> PriceBreakdown {
        let nights = self.calculate_nights(check_in, check_out);

        if nights == 0 {
            return PriceBreakdown {
                nights: 0,
                regular_nights: 0,
                weekend_nights: 0,
                holiday_nights: 0,
                high_season_nights: 0,
                base_total: Decimal::ZERO,
                weekend_surcharge: Decimal::ZERO,
                holiday_surcharge: Decimal::ZERO,
                high_season_surcharge: Decimal::ZERO,
                addons_total: Decimal::ZERO,
                addons: Vec::new(),
                subtotal: Decimal::ZERO,
                discount: DiscountInfo {
                    percent: Decimal::ZERO,
                    amount: Decimal::ZERO,
                    reason: None,
                },
                total: Decimal::ZERO,
                breakdown: Vec::new(),
            };
        }

        let base_price = cabin.base_price_per_night;
        let weekend_price = cabin.effective_weekend_price();

        let mut regular_nights = 0i64;
        let mut weekend_nights = 0i64;
        let mut holiday_nights = 0i64;
        let mut high_season_nights = 0i64;

        let mut base_total = Decimal::ZERO;
        let mut weekend_surcharge = Decimal::ZERO;
        let mut holiday_surcharge = Decimal::ZERO;
        let mut high_season_surcharge = Decimal::ZERO;

        let mut breakdown = Vec::with_capacity(nights as usize);

        for i in 0..nights {
            let d = check_in + chrono::Duration::days(i);
            let is_weekend = self.is_weekend(d);
            let is_holiday = self.is_holiday(d);
            let is_high_season = self.is_high_season(d);
            let is_holiday_season = self.is_holiday_season(d);

            let mut day_price = base_price;

            if is_weekend {
                weekend_nights += 1;
                if weekend_price > base_price {
                    weekend_surcharge += weekend_price - base_price;
                    day_price = weekend_price;
                }
            } else {
                regular_nights += 1;
            }

            if is_holiday {
                holiday_nights += 1;
                let surcharge = base_price * Decimal::new(5, 1); // 0.5
                holiday_surcharge += surcharge;
                day_price += surcharge;
            } else if is_high_season {
                high_season_nights += 1;
                let surcharge = base_price * Decimal::new(2, 1); // 0.2
                high_season_surcharge += surcharge;
                day_price += surcharge;
            } else if is_holiday_season {
                let surcharge = base_price * Decimal::new(3, 1); // 0.3
                high_season_surcharge += surcharge;
                day_price += surcharge;
            }

            base_total += day_price;

            breakdown.push(NightBreakdown {
                date: d,
                is_weekend,
                is_holiday,
                is_high_season,
                price: round2(day_price),
            });
        }

        let addons_total: Decimal = addons.iter().map(|a| a.price).sum();
        let subtotal = base_total + addons_total;

        let discount = if apply_discounts {
            self.calculate_discount(nights, subtotal)
        } else {
            DiscountInfo {
                percent: Decimal::ZERO,
                amount: Decimal::ZERO,
                reason: None,
            }
        };

        let total = round2(subtotal - discount.amount);

        PriceBreakdown {
            nights,
            regular_nights,
            weekend_nights,
            holiday_nights,
            high_season_nights,
            base_total: round2(base_total),
            weekend_surcharge: round2(weekend_surcharge),
            holiday_surcharge: round2(holiday_surcharge),
            high_season_surcharge: round2(high_season_surcharge),
            addons_total: round2(addons_total),
            addons: addons.to_vec(),
            subtotal: round2(subtotal),
            discount,
            total,
            breakdown,
        }
    }
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn cabin(base: Decimal, weekend: Decimal) -> Cabin {
        Cabin {
            id: Uuid::new_v4(),
            short_code: "ZB01".to_string(),
            name: "Test Cabin".to_string(),
            area: None,
            max_adults: 4,
            max_kids: 2,
            features: vec![],
            base_price_per_night: base,
            weekend_price_per_night: Some(weekend),
            image_refs: vec![],
            calendar_ref: Some("cal-1".to_string()),
            street: None,
            city: None,
            postal_code: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn s1_basic_price_no_weekend() {
        let engine = PricingEngine::default();
        let c = cabin(dec!(500), dec!(650));
        // Sun 2026-02-01 -> Tue 2026-02-03, 2 regular nights
        let bd = engine.calculate_price_breakdown(&c, date("2026-02-01"), date("2026-02-03"), &[], true);
        assert_eq!(bd.nights, 2);
        assert_eq!(bd.regular_nights, 2);
        assert_eq!(bd.weekend_nights, 0);
        assert_eq!(bd.total, dec!(1000.00));
    }

    #[test]
    fn s2_weekend_price() {
        let engine = PricingEngine::default();
        let c = cabin(dec!(500), dec!(650));
        // Fri 2026-02-06 -> Sun 2026-02-08, 2 weekend nights
        let bd = engine.calculate_price_breakdown(&c, date("2026-02-06"), date("2026-02-08"), &[], true);
        assert_eq!(bd.nights, 2);
        assert_eq!(bd.weekend_nights, 2);
        assert_eq!(bd.total, dec!(1300.00));
    }

    #[test]
    fn s3_holiday_surcharge() {
        let engine = PricingEngine::default();
        let c = cabin(dec!(500), dec!(500));
        // Thu 2026-05-14 (Independence Day) -> Fri 2026-05-15
        let bd = engine.calculate_price_breakdown(&c, date("2026-05-14"), date("2026-05-15"), &[], true);
        assert_eq!(bd.nights, 1);
        assert_eq!(bd.holiday_nights, 1);
        assert_eq!(bd.total, dec!(750.00));
    }

    #[test]
    fn s4_long_stay_discount_mixed_nights() {
        let engine = PricingEngine::default();
        let c = cabin(dec!(500), dec!(650));
        // Sun 2026-02-01 -> Sun 2026-02-08: 7 nights, 5 regular + 2 weekend
        let bd = engine.calculate_price_breakdown(&c, date("2026-02-01"), date("2026-02-08"), &[], true);
        assert_eq!(bd.nights, 7);
        assert_eq!(bd.regular_nights, 5);
        assert_eq!(bd.weekend_nights, 2);
        assert_eq!(bd.base_total, dec!(3800.00));
        assert_eq!(bd.discount.percent, dec!(10));
        assert_eq!(bd.total, dec!(3420.00));
    }

    #[test]
    fn zero_nights_is_all_zero() {
        let engine = PricingEngine::default();
        let c = cabin(dec!(500), dec!(650));
        let bd = engine.calculate_price_breakdown(&c, date("2026-03-01"), date("2026-03-01"), &[], true);
        assert_eq!(bd.nights, 0);
        assert_eq!(bd.total, Decimal::ZERO);
        assert!(bd.breakdown.is_empty());
    }

    #[test]
    fn weekend_edge_crossing_splits_correctly() {
        let engine = PricingEngine::default();
        let c = cabin(dec!(500), dec!(650));
        // Thu -> Sat: 1 regular (Thu) + 1 weekend (Fri)
        let bd = engine.calculate_price_breakdown(&c, date("2026-02-05"), date("2026-02-07"), &[], true);
        assert_eq!(bd.regular_nights, 1);
        assert_eq!(bd.weekend_nights, 1);
    }

    #[test]
    fn high_season_and_holiday_season_are_mutually_exclusive_and_lose_to_holiday() {
        let engine = PricingEngine::default();
        // 2026-07-01 is a high-season month but also check holiday-season is exclusive with it
        assert!(engine.is_high_season(date("2026-07-15")));
        assert!(!engine.is_holiday_season(date("2026-07-15")));
        assert!(engine.is_holiday_season(date("2026-09-01")));
        assert!(!engine.is_high_season(date("2026-09-01")));
    }

    #[test]
    fn addons_are_included_before_discount() {
        let engine = PricingEngine::default();
        let c = cabin(dec!(500), dec!(500));
        let addons = vec![Addon {
            name: "extra bed".to_string(),
            price: dec!(100),
        }];
        let bd = engine.calculate_price_breakdown(&c, date("2026-02-01"), date("2026-02-03"), &addons, false);
        assert_eq!(bd.addons_total, dec!(100.00));
        assert_eq!(bd.subtotal, dec!(1100.00));
        assert_eq!(bd.discount.amount, Decimal::ZERO);
        assert_eq!(bd.total, dec!(1100.00));
    }
}
