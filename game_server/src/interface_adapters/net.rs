//! Websocket transport for the game endpoint (spec §4.5–§6): upgrades the
//! request, validates `roomId`/`username`/`playerHint`, joins the Game
//! Room, then runs a `tokio::select!` loop forwarding inbound frames to
//! the room service and outbound hub messages to the socket, alongside a
//! 5-second keepalive ping task.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::Value;

use conn_hub::{ClientId, Outbound};

use crate::interface_adapters::protocol::{InboundAction, ServerEvent, parse_inbound_action};
use crate::interface_adapters::state::AppState;
use crate::use_cases::JoinResult;

/// Keepalive cadence (spec §4.5: "a 5-second ping task").
const PING_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
pub struct GameQuery {
    #[serde(rename = "roomId", default)]
    room_id: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(rename = "playerHint", default)]
    player_hint: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    axum::extract::Query(query): axum::extract::Query<GameQuery>,
) -> impl IntoResponse {
    let room_id = query.room_id.filter(|s| !s.is_empty());
    let username = query.username.filter(|s| !s.is_empty());
    // Required but unconsulted for slot assignment (spec §9 open question).
    let player_hint = query.player_hint.filter(|s| !s.is_empty());

    let (Some(room_id), Some(username), Some(_hint)) = (room_id, username, player_hint) else {
        // "the socket is closed without an event" (spec §6).
        return ws.on_upgrade(|socket| async move {
            let _ = socket.close().await;
        });
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, room_id, username))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, room_id: String, username: String) {
    let (tx, outbound_rx) = tokio::sync::mpsc::unbounded_channel();
    let client_id = state.hub.register(tx);

    let slot = match state.room_service.join(&room_id, &username, client_id) {
        JoinResult::Accepted { slot, .. } => slot,
        JoinResult::Rejected(error) => {
            tracing::info!(room_id, username, ?error, "join rejected");
            state.hub.unregister(client_id);
            let _ = socket.close().await;
            return;
        }
    };

    tracing::info!(room_id, username, slot, "player joined room");
    run_client_loop(socket, client_id, &state, &room_id, slot, outbound_rx).await;

    if let Some(room) = state.room_service.registry().get(&room_id) {
        state.room_service.mark_disconnected(room_id.clone(), room, slot);
    }
    state.hub.unregister(client_id);
    tracing::info!(room_id, username, slot, "player disconnected");
}

async fn run_client_loop(
    mut socket: WebSocket,
    client_id: ClientId,
    state: &AppState,
    room_id: &str,
    slot: usize,
    mut outbound_rx: tokio::sync::mpsc::UnboundedReceiver<Outbound>,
) {
    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // first tick fires immediately; skip it

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = dispatch(state, room_id, slot, &text) {
                            if !send_event(&mut socket, &reply).await {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) => break,
                    Some(Ok(Message::Binary(_))) => break,
                    Some(Err(error)) => {
                        tracing::warn!(%client_id, room_id, error = %error, "websocket recv error");
                        break;
                    }
                    None => break,
                }
            }

            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(Outbound::Text(text)) => {
                        if socket.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    Some(Outbound::Close { code, reason }) => {
                        let _ = socket
                            .send(Message::Close(Some(CloseFrame { code, reason: reason.into() })))
                            .await;
                        let _ = socket.close().await;
                        break;
                    }
                    None => break,
                }
            }

            _ = ping_interval.tick() => {
                if socket.send(Message::Ping(Vec::new().into())).await.is_err() {
                    // A failed write is treated identically to a disconnect (spec §4.5).
                    break;
                }
            }
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(text) => socket.send(Message::Text(text.into())).await.is_ok(),
        Err(error) => {
            tracing::error!(error = %error, "failed to serialize outbound event");
            true
        }
    }
}

/// Parses and routes one inbound text frame (spec §4.2, §4.5). Malformed
/// `flip`/`move` payloads get a reply; an unrecognized `action` is ignored
/// silently; anything producing a domain-level rejection is logged, not
/// replied to (spec §7: "Log; no state change; no reply").
fn dispatch(state: &AppState, room_id: &str, slot: usize, text: &str) -> Option<ServerEvent> {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => {
            return Some(ServerEvent::Error {
                message: "Invalid JSON format, please check the fields".to_string(),
            });
        }
    };

    match parse_inbound_action(&value) {
        Ok(InboundAction::Flip { card_index }) => {
            if card_index < 0 {
                tracing::debug!(room_id, slot, card_index, "flip index out of range");
                return None;
            }
            if let Err(error) = state.room_service.flip(room_id, slot, card_index as usize) {
                tracing::debug!(room_id, slot, ?error, "flip rejected");
            }
            None
        }
        Ok(InboundAction::Move { matched }) => {
            if let Err(error) = state.room_service.legacy_move(room_id, slot, matched) {
                tracing::debug!(room_id, slot, ?error, "legacy move rejected");
            }
            None
        }
        Ok(InboundAction::Quit) => {
            state.room_service.quit(room_id, slot);
            None
        }
        Ok(InboundAction::Ignored) => None,
        Err(message) => Some(ServerEvent::Error {
            message: message.to_string(),
        }),
    }
}
