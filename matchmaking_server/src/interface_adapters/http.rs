//! Plain HTTP surface alongside the websocket endpoint: a root health string
//! and a `/status` JSON summary, mirroring the reference server's bare
//! `http.HandleFunc` endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;

use crate::domain::queue_entry::now_millis;
use crate::interface_adapters::protocol::StatusResponse;
use crate::interface_adapters::state::AppState;

pub async fn root() -> impl IntoResponse {
    "Matchmaking server is running"
}

pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    axum::Json(StatusResponse {
        status: "ok",
        matches_made: state.matchmaker.matches_made(),
        timestamp: now_millis(),
    })
}
