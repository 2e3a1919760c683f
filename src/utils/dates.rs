//! Flexible date/time parsing for the booking and availability endpoints.
//!
//! Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM`, `YYYY-MM-DDTHH:MM`, and
//! `DD/MM/YYYY[ HH:MM]`. A date with no time-of-day defaults to noon, which
//! keeps a naive local-midnight/next-local-midnight pair from landing on
//! different UTC calendar days under most timezone offsets.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{AppError, AppResult};

fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).expect("12:00:00 is a valid time")
}

/// Parses any of the accepted wire formats into a `NaiveDateTime`, defaulting
/// time-of-day to noon when the input carries a date only.
pub fn parse_flexible_datetime(value: &str, field: &str) -> AppResult<NaiveDateTime> {
    let trimmed = value.trim();

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%d/%m/%Y %H:%M") {
        return Ok(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(noon()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y") {
        return Ok(date.and_time(noon()));
    }

    Err(AppError::InvalidFormat(format!(
        "{field} must be one of YYYY-MM-DD, YYYY-MM-DD HH:MM, YYYY-MM-DDTHH:MM, or DD/MM/YYYY[ HH:MM]"
    )))
}

/// Same as [`parse_flexible_datetime`] but drops the time-of-day, for
/// operations (booking, hold, quote) that only care about the calendar day.
pub fn parse_flexible_date(value: &str, field: &str) -> AppResult<NaiveDate> {
    Ok(parse_flexible_datetime(value, field)?.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_iso_date_only() {
        let d = parse_flexible_date("2026-03-10", "check_in").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
    }

    #[test]
    fn accepts_iso_date_with_space_time() {
        let dt = parse_flexible_datetime("2026-03-10 14:30", "check_in").unwrap();
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(14, 30, 0).unwrap());
    }

    #[test]
    fn accepts_iso_date_with_t_time() {
        let dt = parse_flexible_datetime("2026-03-10T14:30", "check_in").unwrap();
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(14, 30, 0).unwrap());
    }

    #[test]
    fn accepts_slash_date() {
        let d = parse_flexible_date("10/03/2026", "check_in").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
    }

    #[test]
    fn accepts_slash_date_with_time() {
        let dt = parse_flexible_datetime("10/03/2026 09:00", "check_in").unwrap();
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    }

    #[test]
    fn date_only_defaults_to_noon() {
        let dt = parse_flexible_datetime("2026-03-10", "check_in").unwrap();
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_flexible_date("not-a-date", "check_in").is_err());
    }
}
