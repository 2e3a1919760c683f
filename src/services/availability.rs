//! Availability resolver
//!
//! Filters the cabin catalog down to cabins that satisfy capacity/area/feature
//! constraints and have no conflicting calendar event in a requested window.
//! New module: the teacher has no direct equivalent (loyalty tiers have no
//! notion of a bookable resource calendar), so the per-cabin exclusion
//! sequence below is grounded directly on the functional requirements rather
//! than an adapted teacher file; the calendar-error tolerance (log and
//! exclude the cabin rather than fail the request) follows the same
//! best-effort-per-item pattern as `services/slipok.rs`'s "not configured"
//! short-circuit.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::cabin::Cabin;
use crate::services::calendar_gateway::CalendarGatewayService;

#[derive(Debug, Clone, Default)]
pub struct AvailabilityQuery {
    pub adults: Option<i32>,
    pub kids: Option<i32>,
    pub area: Option<String>,
    pub wanted_features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableCabin {
    pub cabin_id: uuid::Uuid,
    pub short_code: String,
    pub name: String,
}

pub struct AvailabilityResolver<'a> {
    calendar: &'a dyn CalendarGatewayService,
}

impl<'a> AvailabilityResolver<'a> {
    pub fn new(calendar: &'a dyn CalendarGatewayService) -> Self {
        Self { calendar }
    }

    /// Synchronous pre-filter: capacity, area, features. Does not touch the
    /// calendar gateway, so it's cheap to run before the async availability pass.
    fn passes_static_filters(cabin: &Cabin, query: &AvailabilityQuery) -> bool {
        if cabin.calendar_ref.is_none() {
            return false;
        }
        if let Some(adults) = query.adults {
            if adults > cabin.max_adults {
                return false;
            }
        }
        if let Some(kids) = query.kids {
            if kids > cabin.max_kids {
                return false;
            }
        }
        if let Some(area) = &query.area {
            if !cabin.matches_area(area) {
                return false;
            }
        }
        for feature in &query.wanted_features {
            if !cabin.has_feature(feature) {
                return false;
            }
        }
        true
    }

    /// Resolves availability for `[check_in, check_out)` (UTC) across `cabins`.
    /// Per-cabin calendar errors are logged and the cabin excluded rather than
    /// failing the whole request.
    pub async fn resolve(
        &self,
        cabins: &[Cabin],
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        query: &AvailabilityQuery,
    ) -> Vec<AvailableCabin> {
        let mut available = Vec::new();

        for cabin in cabins {
            if !Self::passes_static_filters(cabin, query) {
                continue;
            }

            let calendar_ref = cabin.calendar_ref.as_ref().expect("checked above");
            let events = match self.calendar.list_events(calendar_ref, check_in, check_out).await {
                Ok(events) => events,
                Err(err) => {
                    tracing::warn!(
                        cabin = %cabin.short_code,
                        error = %err,
                        "calendar lookup failed, excluding cabin from availability"
                    );
                    continue;
                },
            };

            let has_conflict = events.iter().any(|event| event.overlaps(check_in, check_out));
            if has_conflict {
                continue;
            }

            available.push(AvailableCabin {
                cabin_id: cabin.id,
                short_code: cabin.short_code.clone(),
                name: cabin.name.clone(),
            });
        }

        available
    }

    /// Per-cabin fully-free days within a calendar month, used by the
    /// conversational agent's "show me availability for <month>" flow. Not
    /// exposed as a public HTTP operation.
    pub async fn free_days_in_month(
        &self,
        cabin: &Cabin,
        year: i32,
        month: u32,
    ) -> Option<Vec<NaiveDate>> {
        let calendar_ref = cabin.calendar_ref.as_ref()?;

        let month_start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let month_end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };

        let range_start = month_start.and_hms_opt(0, 0, 0)?.and_utc();
        let range_end = month_end.and_hms_opt(0, 0, 0)?.and_utc();

        let events = self
            .calendar
            .list_events(calendar_ref, range_start, range_end)
            .await
            .ok()?;

        let mut free_days = Vec::new();
        let mut day = month_start;
        while day < month_end {
            let day_start = day.and_hms_opt(0, 0, 0)?.and_utc();
            let day_end = day_start + chrono::Duration::days(1);
            let busy = events.iter().any(|event| event.overlaps(day_start, day_end));
            if !busy {
                free_days.push(day);
            }
            day = day.succ_opt()?;
            if day.month() != month && day.year() == year {
                break;
            }
        }

        Some(free_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::calendar_gateway::CalendarEvent;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use uuid::Uuid;

    struct FakeCalendar {
        events: Vec<CalendarEvent>,
    }

    #[async_trait]
    impl CalendarGatewayService for FakeCalendar {
        async fn list_events(
            &self,
            _calendar_ref: &str,
            _time_min: DateTime<Utc>,
            _time_max: DateTime<Utc>,
        ) -> Result<Vec<CalendarEvent>, crate::error::AppError> {
            Ok(self.events.clone())
        }

        async fn insert_event(
            &self,
            _calendar_ref: &str,
            _details: &crate::services::calendar_gateway::NewEventDetails,
        ) -> Result<(String, Option<String>), crate::error::AppError> {
            unimplemented!()
        }

        async fn delete_event(
            &self,
            _calendar_ref: &str,
            _event_ref: &str,
        ) -> Result<(), crate::error::AppError> {
            unimplemented!()
        }
    }

    fn cabin() -> Cabin {
        Cabin {
            id: Uuid::new_v4(),
            short_code: "ZB01".to_string(),
            name: "Zimmer Bayit".to_string(),
            area: Some("Galilee".to_string()),
            max_adults: 2,
            max_kids: 1,
            features: vec!["hot tub".to_string()],
            base_price_per_night: rust_decimal::Decimal::from(500),
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

    #[tokio::test]
    async fn excludes_cabin_over_adult_capacity() {
        let calendar = FakeCalendar { events: vec![] };
        let resolver = AvailabilityResolver::new(&calendar);
        let query = AvailabilityQuery {
            adults: Some(3),
            ..Default::default()
        };
        let result = resolver
            .resolve(
                &[cabin()],
                Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 3, 12, 0, 0, 0).unwrap(),
                &query,
            )
            .await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn excludes_cabin_with_conflicting_event() {
        let event = CalendarEvent {
            event_ref: "e1".to_string(),
            event_link: None,
            start: Utc.with_ymd_and_hms(2026, 3, 11, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 3, 13, 0, 0, 0).unwrap(),
            summary: None,
            cancelled: false,
        };
        let calendar = FakeCalendar { events: vec![event] };
        let resolver = AvailabilityResolver::new(&calendar);
        let result = resolver
            .resolve(
                &[cabin()],
                Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 3, 12, 0, 0, 0).unwrap(),
                &AvailabilityQuery::default(),
            )
            .await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn includes_cabin_with_no_conflicts() {
        let calendar = FakeCalendar { events: vec![] };
        let resolver = AvailabilityResolver::new(&calendar);
        let result = resolver
            .resolve(
                &[cabin()],
                Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 3, 12, 0, 0, 0).unwrap(),
                &AvailabilityQuery::default(),
            )
            .await;
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].short_code, "ZB01");
    }

    #[tokio::test]
    async fn excludes_cabin_missing_calendar_ref() {
        let mut c = cabin();
        c.calendar_ref = None;
        let calendar = FakeCalendar { events: vec![] };
        let resolver = AvailabilityResolver::new(&calendar);
        let result = resolver
            .resolve(
                &[c],
                Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 3, 12, 0, 0, 0).unwrap(),
                &AvailabilityQuery::default(),
            )
            .await;
        assert!(result.is_empty());
    }
}
