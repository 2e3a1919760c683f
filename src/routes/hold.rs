//! Hold create/read/release routes (§4.C).

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::cabin::Cabin;
use crate::models::hold::{CreateHoldRequest, HoldResponse};
use crate::state::AppState;
use crate::utils::dates::parse_flexible_date;

async fn create_hold(
    State(state): State<AppState>,
    Json(request): Json<CreateHoldRequest>,
) -> AppResult<Json<HoldResponse>> {
    let check_in = parse_flexible_date(&request.check_in, "check_in")?;
    let check_out = parse_flexible_date(&request.check_out, "check_out")?;
    if check_out <= check_in {
        return Err(AppError::InvalidInput("check_out must be after check_in".to_string()));
    }

    let cabin = sqlx::query_as::<_, Cabin>("SELECT * FROM cabins WHERE short_code = $1 OR name = $1")
        .bind(&request.cabin)
        .fetch_optional(state.db())
        .await?
        .ok_or_else(|| AppError::CabinNotFound(request.cabin.clone()))?;

    let hold_manager = state.hold_manager();
    let mut hold_manager = hold_manager.lock().await;
    let created = hold_manager
        .create_hold(&cabin.short_code, check_in, check_out, request.customer_id, request.customer_name)
        .await?;

    let mut response: HoldResponse = created.hold.into();
    response.warning = created.warning;
    Ok(Json(response))
}

async fn get_hold(State(state): State<AppState>, Path(hold_id): Path<Uuid>) -> AppResult<Json<HoldResponse>> {
    let hold_manager = state.hold_manager();
    let mut hold_manager = hold_manager.lock().await;
    let hold = hold_manager
        .get_hold(hold_id)
        .await?
        .ok_or_else(|| AppError::HoldNotFound(hold_id.to_string()))?;
    Ok(Json(hold.into()))
}

async fn release_hold(State(state): State<AppState>, Path(hold_id): Path<Uuid>) -> AppResult<Json<serde_json::Value>> {
    let hold_manager = state.hold_manager();
    let mut hold_manager = hold_manager.lock().await;
    let released = hold_manager.release_hold(hold_id).await;
    if !released {
        return Err(AppError::HoldNotFound(hold_id.to_string()));
    }
    Ok(Json(serde_json::json!({ "released": true })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hold", post(create_hold))
        .route("/hold/:hold_id", get(get_hold).delete(release_hold))
}
