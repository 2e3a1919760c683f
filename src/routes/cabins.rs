//! Catalog, availability, calendar, and quote routes.
//!
//! Structured the way `routes::health` shapes its handlers: thin functions
//! taking `State<AppState>` and a request body, delegating to the service
//! layer, wrapped in the crate's `AppResult<Json<T>>` convention (see
//! `services::booking` for the same pattern on the write side).

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::cabin::{Cabin, CabinResponse};
use crate::services::availability::{AvailabilityQuery, AvailabilityResolver, AvailableCabin};
use crate::services::calendar_gateway::CalendarGatewayService;
use crate::services::pricing::{Addon, PriceBreakdown};
use crate::state::AppState;
use crate::utils::dates::parse_flexible_date;

async fn list_cabins(State(state): State<AppState>) -> AppResult<Json<Vec<CabinResponse>>> {
    let cabins = sqlx::query_as::<_, Cabin>("SELECT * FROM cabins ORDER BY short_code")
        .fetch_all(state.db())
        .await?;
    Ok(Json(cabins.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub check_in: String,
    pub check_out: String,
    pub adults: Option<i32>,
    pub kids: Option<i32>,
    pub area: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    /// Narrow the search to one cabin by short_code; otherwise searches the
    /// whole catalog.
    pub cabin: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub check_in: String,
    pub check_out: String,
    pub cabins: Vec<AvailableCabin>,
}

async fn check_availability(
    State(state): State<AppState>,
    Json(request): Json<AvailabilityRequest>,
) -> AppResult<Json<AvailabilityResponse>> {
    let check_in = parse_flexible_date(&request.check_in, "check_in")?;
    let check_out = parse_flexible_date(&request.check_out, "check_out")?;
    if check_out <= check_in {
        return Err(AppError::InvalidInput("check_out must be after check_in".to_string()));
    }

    let cabins = match &request.cabin {
        Some(identifier) => sqlx::query_as::<_, Cabin>(
            "SELECT * FROM cabins WHERE short_code = $1 OR name = $1",
        )
        .bind(identifier)
        .fetch_all(state.db())
        .await?,
        None => sqlx::query_as::<_, Cabin>("SELECT * FROM cabins ORDER BY short_code")
            .fetch_all(state.db())
            .await?,
    };

    let calendar: Arc<dyn CalendarGatewayService> = state.calendar_gateway();
    let resolver = AvailabilityResolver::new(calendar.as_ref());
    let query = AvailabilityQuery {
        adults: request.adults,
        kids: request.kids,
        area: request.area,
        wanted_features: request.features,
    };

    let check_in_utc = check_in.and_hms_opt(0, 0, 0).expect("valid time").and_utc();
    let check_out_utc = check_out.and_hms_opt(0, 0, 0).expect("valid time").and_utc();
    let available = resolver.resolve(&cabins, check_in_utc, check_out_utc, &query).await;

    Ok(Json(AvailabilityResponse {
        check_in: check_in.to_string(),
        check_out: check_out.to_string(),
        cabins: available,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub cabin_id: Uuid,
    pub short_code: String,
    pub year: i32,
    pub month: u32,
    pub free_days: Vec<chrono::NaiveDate>,
}

async fn cabin_calendar(
    State(state): State<AppState>,
    Path(cabin_id): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<CalendarResponse>> {
    let cabin = sqlx::query_as::<_, Cabin>("SELECT * FROM cabins WHERE short_code = $1 OR name = $1")
        .bind(&cabin_id)
        .fetch_optional(state.db())
        .await?
        .ok_or_else(|| AppError::CabinNotFound(cabin_id.clone()))?;

    let calendar: Arc<dyn CalendarGatewayService> = state.calendar_gateway();
    let resolver = AvailabilityResolver::new(calendar.as_ref());
    let free_days = resolver
        .free_days_in_month(&cabin, query.year, query.month)
        .await
        .ok_or_else(|| AppError::CabinNotFound(cabin.short_code.clone()))?;

    Ok(Json(CalendarResponse {
        cabin_id: cabin.id,
        short_code: cabin.short_code,
        year: query.year,
        month: query.month,
        free_days,
    }))
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub cabin: String,
    pub check_in: String,
    pub check_out: String,
    #[serde(default)]
    pub addons: Vec<Addon>,
    #[serde(default = "default_true")]
    pub apply_discounts: bool,
}

fn default_true() -> bool {
    true
}

async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> AppResult<Json<PriceBreakdown>> {
    let check_in = parse_flexible_date(&request.check_in, "check_in")?;
    let check_out = parse_flexible_date(&request.check_out, "check_out")?;
    // A zero-night range (check_out == check_in) is a valid boundary case
    // that resolves to an all-zero breakdown (see `PricingEngine`'s
    // `nights == 0` short-circuit); only a backwards range is an error.
    if check_out < check_in {
        return Err(AppError::InvalidInput("check_out must not be before check_in".to_string()));
    }

    let cabin = sqlx::query_as::<_, Cabin>("SELECT * FROM cabins WHERE short_code = $1 OR name = $1")
        .bind(&request.cabin)
        .fetch_optional(state.db())
        .await?
        .ok_or_else(|| AppError::CabinNotFound(request.cabin.clone()))?;

    let pricing = state.pricing();
    let breakdown = pricing.calculate_price_breakdown(
        &cabin,
        check_in,
        check_out,
        &request.addons,
        request.apply_discounts,
    );

    Ok(Json(breakdown))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cabins", get(list_cabins))
        .route("/availability", post(check_availability))
        .route("/cabin/calendar/:cabin_id", get(cabin_calendar))
        .route("/quote", post(quote))
}
