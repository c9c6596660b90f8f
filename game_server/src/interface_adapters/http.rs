//! Plain HTTP surface alongside the websocket endpoint (spec §6): a root
//! health string, mirroring the matchmaking server's bare handler.

use axum::response::IntoResponse;

pub async fn root() -> impl IntoResponse {
    "Game server is running"
}
