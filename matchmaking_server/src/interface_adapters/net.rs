//! Websocket transport for the matchmaking endpoint: upgrades the request,
//! registers the connection with the hub, sends `welcome`, then runs a
//! `tokio::select!` loop forwarding inbound frames to the router and
//! outbound hub messages to the socket.

use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use serde_json::Value;

use conn_hub::{ClientId, Outbound};

use crate::interface_adapters::protocol::{parse_cancel_request, parse_queue_request, ServerEvent};
use crate::interface_adapters::state::AppState;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let (tx, outbound_rx) = tokio::sync::mpsc::unbounded_channel();
    let client_id = state.hub.register(tx);

    let welcome = ServerEvent::Welcome {
        message: "Connected to the matchmaking server".to_string(),
        client_id: client_id.to_string(),
    };
    match serde_json::to_string(&welcome) {
        Ok(text) => {
            if socket.send(Message::Text(text.into())).await.is_err() {
                state.hub.unregister(client_id);
                return;
            }
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize welcome event");
            state.hub.unregister(client_id);
            return;
        }
    }

    tracing::info!(%client_id, "client connected");
    run_client_loop(socket, client_id, &state, outbound_rx).await;
    state.hub.unregister(client_id);
    tracing::info!(%client_id, "client disconnected");
}

async fn run_client_loop(
    mut socket: WebSocket,
    client_id: ClientId,
    state: &AppState,
    mut outbound_rx: tokio::sync::mpsc::UnboundedReceiver<Outbound>,
) {
    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = dispatch(state, client_id, &text).await {
                            if !send_event(&mut socket, &reply).await {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) => break,
                    Some(Ok(Message::Binary(_))) => {
                        // Non-text frames terminate the connection.
                        break;
                    }
                    Some(Err(err)) => {
                        tracing::warn!(%client_id, error = %err, "websocket recv error");
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
                            .send(Message::Close(Some(CloseFrame {
                                code,
                                reason: reason.into(),
                            })))
                            .await;
                        let _ = socket.close().await;
                        break;
                    }
                    None => break,
                }
            }
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(text) => socket.send(Message::Text(text.into())).await.is_ok(),
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize outbound event");
            true
        }
    }
}

/// Parses and routes one inbound text frame. Returns `None` for `received`
/// (acknowledgement, no reply) and for anything that should not produce a
/// response frame.
async fn dispatch(state: &AppState, client_id: ClientId, text: &str) -> Option<ServerEvent> {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => {
            return Some(ServerEvent::Error {
                message: "Invalid JSON format, please check the fields".to_string(),
            });
        }
    };

    let frame_type = match value.get("type").and_then(Value::as_str) {
        Some(t) if !t.is_empty() => t,
        _ => {
            return Some(ServerEvent::Error {
                message: "Invalid JSON format, please check the fields".to_string(),
            });
        }
    };

    match frame_type {
        "queue" => match parse_queue_request(&value) {
            Ok(request) => Some(state.queue_service.handle_queue(client_id, request).await),
            Err(message) => Some(ServerEvent::Error {
                message: message.to_string(),
            }),
        },
        "cancel" => match parse_cancel_request(&value) {
            Ok(request) => Some(state.queue_service.handle_cancel(request).await),
            Err(message) => Some(ServerEvent::Error {
                message: message.to_string(),
            }),
        },
        "received" => None,
        other => Some(ServerEvent::Error {
            message: format!("Unknown message type: {other}"),
        }),
    }
}
