//! Conversational agent route (§4.F, `POST /agent/chat`).

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::error::AppResult;
use crate::models::conversation::{ChatRequest, ChatResponse};
use crate::state::AppState;

async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> AppResult<Json<ChatResponse>> {
    let response = state.agent().chat(request).await?;
    Ok(Json(response))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/agent/chat", post(chat))
}
