//! Calendar gateway
//!
//! Read/write access to a per-cabin external calendar: list busy events in a
//! half-open `[timeMin, timeMax)` window, insert a booking event, delete one
//! by reference. Structured as an `async-trait` over `reqwest`, the same
//! shape this codebase uses for its other external integrations
//! (`services::slipok`, `services::oauth`), so a `wiremock`-backed fake can
//! stand in for tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::CalendarConfig;
use crate::error::AppError;

/// A single calendar event, normalized to a half-open UTC interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Provider-assigned event id.
    pub event_ref: String,
    /// Link to view the event in the provider's UI, if any.
    pub event_link: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: Option<String>,
    pub cancelled: bool,
}

impl CalendarEvent {
    /// Standard half-open interval overlap test: `a.start < b.end && b.start < a.end`.
    pub fn overlaps(&self, range_start: DateTime<Utc>, range_end: DateTime<Utc>) -> bool {
        !self.cancelled && self.start < range_end && range_start < self.end
    }
}

/// Fields used to build the structured description on a newly-created event.
#[derive(Debug, Clone)]
pub struct NewEventDetails {
    pub cabin_short_code: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub notes: Option<String>,
}

impl NewEventDetails {
    /// Key: value description lines, matching the commit step's structured format.
    fn description(&self) -> String {
        let mut lines = vec![
            format!("cabin: {}", self.cabin_short_code),
            format!("customer: {}", self.customer_name),
        ];
        if let Some(phone) = &self.customer_phone {
            lines.push(format!("phone: {}", phone));
        }
        lines.push(format!("check_in: {}", self.check_in.to_rfc3339()));
        lines.push(format!("check_out: {}", self.check_out.to_rfc3339()));
        if let Some(notes) = &self.notes {
            lines.push(format!("notes: {}", notes));
        }
        lines.join("\n")
    }
}

#[async_trait]
pub trait CalendarGatewayService: Send + Sync {
    /// List non-cancelled events in `[time_min, time_max)` for `calendar_ref`.
    async fn list_events(
        &self,
        calendar_ref: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, AppError>;

    /// Insert a new event and return its `(event_ref, event_link)`.
    async fn insert_event(
        &self,
        calendar_ref: &str,
        details: &NewEventDetails,
    ) -> Result<(String, Option<String>), AppError>;

    /// Delete an event by its provider reference.
    async fn delete_event(&self, calendar_ref: &str, event_ref: &str) -> Result<(), AppError>;
}

/// Concrete client against a generic calendar HTTP API (REST, events keyed by
/// `calendarRef`, RFC3339 `Z`-suffixed instants).
#[derive(Debug, Clone)]
pub struct CalendarGatewayClient {
    client: Client,
    config: CalendarConfig,
}

#[derive(Debug, Deserialize)]
struct ListEventsResponse {
    events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "htmlLink")]
    html_link: Option<String>,
    start: RawEventTime,
    end: RawEventTime,
    summary: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEventTime {
    #[serde(rename = "dateTime")]
    date_time: Option<DateTime<Utc>>,
    date: Option<chrono::NaiveDate>,
}

impl RawEventTime {
    /// All-day events carry a date-only boundary; `Z`-suffixed midnight is
    /// the convention both ends of this gateway agree on, so `end_exclusive`
    /// needs no special-casing here.
    fn to_utc_instant(&self) -> Option<DateTime<Utc>> {
        if let Some(dt) = self.date_time {
            return Some(dt);
        }
        Some(self.date?.and_hms_opt(0, 0, 0)?.and_utc())
    }
}

#[derive(Debug, Serialize)]
struct InsertEventRequest {
    summary: String,
    description: String,
    start: EventTimePayload,
    end: EventTimePayload,
}

#[derive(Debug, Serialize)]
struct EventTimePayload {
    #[serde(rename = "dateTime")]
    date_time: String,
}

impl CalendarGatewayClient {
    pub fn new(config: CalendarConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    fn base_url(&self) -> Result<&str, AppError> {
        self.config
            .base_url
            .as_deref()
            .ok_or_else(|| AppError::CalendarUnreachable("calendar gateway is not configured".to_string()))
    }

    fn api_key(&self) -> Result<&str, AppError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::CalendarUnreachable("calendar gateway is not configured".to_string()))
    }

    fn map_transport_error(err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            AppError::ExternalServiceTimeout("calendar gateway".to_string())
        } else if err.is_connect() {
            AppError::ExternalServiceUnavailable("calendar gateway".to_string())
        } else {
            AppError::CalendarUnreachable(err.to_string())
        }
    }
}

#[async_trait]
impl CalendarGatewayService for CalendarGatewayClient {
    async fn list_events(
        &self,
        calendar_ref: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, AppError> {
        let base_url = self.base_url()?;
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(format!("{base_url}/calendars/{calendar_ref}/events"))
            .header("Authorization", format!("Bearer {api_key}"))
            .query(&[
                ("timeMin", time_min.to_rfc3339()),
                ("timeMax", time_max.to_rfc3339()),
            ])
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        match response.status() {
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                return Err(AppError::CalendarForbidden(calendar_ref.to_string()));
            },
            StatusCode::NOT_FOUND => {
                return Err(AppError::NotFound(format!("calendar {calendar_ref}")));
            },
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::CalendarUnreachable(format!(
                    "HTTP {status}: {body}"
                )));
            },
            _ => {},
        }

        let parsed: ListEventsResponse = response
            .json()
            .await
            .map_err(|e| AppError::CalendarUnreachable(format!("malformed response: {e}")))?;

        let events = parsed
            .events
            .into_iter()
            .filter_map(|raw| {
                let start = raw.start.to_utc_instant()?;
                let end = raw.end.to_utc_instant()?;
                Some(CalendarEvent {
                    event_ref: raw.id,
                    event_link: raw.html_link,
                    start,
                    end,
                    summary: raw.summary,
                    cancelled: raw.status.as_deref() == Some("cancelled"),
                })
            })
            .collect();

        Ok(events)
    }

    async fn insert_event(
        &self,
        calendar_ref: &str,
        details: &NewEventDetails,
    ) -> Result<(String, Option<String>), AppError> {
        let base_url = self.base_url()?;
        let api_key = self.api_key()?;

        let body = InsertEventRequest {
            summary: format!("Booking: {}", details.cabin_short_code),
            description: details.description(),
            start: EventTimePayload {
                date_time: details.check_in.to_rfc3339(),
            },
            end: EventTimePayload {
                date_time: details.check_out.to_rfc3339(),
            },
        };

        let response = self
            .client
            .post(format!("{base_url}/calendars/{calendar_ref}/events"))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if response.status() == StatusCode::FORBIDDEN || response.status() == StatusCode::UNAUTHORIZED {
            return Err(AppError::CalendarForbidden(calendar_ref.to_string()));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::CalendarUnreachable(format!(
                "HTTP {status}: {body}"
            )));
        }

        let raw: RawEvent = response
            .json()
            .await
            .map_err(|e| AppError::CalendarUnreachable(format!("malformed response: {e}")))?;

        Ok((raw.id, raw.html_link))
    }

    async fn delete_event(&self, calendar_ref: &str, event_ref: &str) -> Result<(), AppError> {
        let base_url = self.base_url()?;
        let api_key = self.api_key()?;

        let response = self
            .client
            .delete(format!(
                "{base_url}/calendars/{calendar_ref}/events/{event_ref}"
            ))
            .header("Authorization", format!("Bearer {api_key}"))
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if response.status() == StatusCode::FORBIDDEN || response.status() == StatusCode::UNAUTHORIZED {
            return Err(AppError::CalendarForbidden(calendar_ref.to_string()));
        }
        if !response.status().is_success() && response.status() != StatusCode::NOT_FOUND {
            let status = response.status();
            return Err(AppError::CalendarUnreachable(format!("HTTP {status}")));
        }

        Ok(())
    }
}
