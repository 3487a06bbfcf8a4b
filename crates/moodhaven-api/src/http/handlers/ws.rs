//! WebSocket handler for the realtime counselor chat relay.
//!
//! The `/ws` endpoint upgrades an HTTP connection to a WebSocket. The
//! upgrade request must carry a valid bearer token (header or `?token=`
//! query parameter); the authenticated identity is bound to the connection
//! and attributed to every message it relays.
//!
//! Once connected, the handler:
//!
//! - **Sends a connected signal:** one `{"type":"connected"}` frame after
//!   the handshake.
//! - **Relays inbound frames:** each text frame goes through
//!   [`MessageRelay::handle_frame`]; per-frame failures come back as
//!   `{"type":"error", ...}` to this connection only, and the connection
//!   stays open.
//! - **Delivers broadcasts:** payloads fanned out by the relay arrive on
//!   this connection's registry channel and are pushed to the client.
//!
//! Close and protocol errors are terminal: the connection is unregistered
//! and in-flight broadcasts to it are silently skipped.
//!
//! [`MessageRelay::handle_frame`]: moodhaven_core::relay::service::MessageRelay::handle_frame

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use moodhaven_core::relay::frame::OutboundFrame;

use crate::http::error::AppError;
use crate::http::extractors::auth::lookup_token;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    token: Option<String>,
}

/// Upgrade an HTTP request to a WebSocket connection for the chat relay.
///
/// This is mounted at `/ws` in the router.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = authenticate_upgrade(&state, &headers, query.token.as_deref()).await?;
    Ok(ws.on_upgrade(move |socket| handle_ws_connection(socket, state, user_id)))
}

/// Resolve the upgrade request's token to a user before accepting it.
async fn authenticate_upgrade(
    state: &AppState,
    headers: &HeaderMap,
    query_token: Option<&str>,
) -> Result<Uuid, AppError> {
    let header_token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .or_else(|| headers.get("x-api-token").and_then(|v| v.to_str().ok()));

    let token = header_token
        .or(query_token)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing token on WebSocket upgrade".to_string()))?;

    lookup_token(state, token).await
}

/// Core WebSocket connection handler.
///
/// Uses `tokio::select!` to multiplex between broadcast deliveries from the
/// connection registry and incoming frames from the client. Both halves stay
/// in a single task, so per-connection frames are handled to completion in
/// arrival order.
async fn handle_ws_connection(socket: WebSocket, state: AppState, user_id: Uuid) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let (connection_id, mut deliveries) = state.registry.register(user_id);

    // Connectivity-established signal.
    match serde_json::to_string(&OutboundFrame::Connected) {
        Ok(json) => {
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                state.registry.unregister(connection_id);
                return;
            }
        }
        Err(err) => {
            tracing::warn!("Failed to serialize connected frame: {err}");
        }
    }

    loop {
        tokio::select! {
            // --- Branch 1: Push relay broadcasts to this client ---
            delivery = deliveries.recv() => {
                match delivery {
                    Some(payload) => {
                        if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                            // Client disconnected
                            break;
                        }
                    }
                    // Registry entry removed (server shutting down)
                    None => break,
                }
            }

            // --- Branch 2: Relay frames from this client ---
            msg_result = ws_receiver.next() => {
                match msg_result {
                    Some(Ok(Message::Text(text))) => {
                        let reply = state.relay.handle_frame(connection_id, user_id, &text).await;
                        if let Some(frame) = reply {
                            match serde_json::to_string(&frame) {
                                Ok(json) => {
                                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                                        break;
                                    }
                                }
                                Err(err) => {
                                    tracing::warn!("Failed to serialize error frame: {err}");
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        // Client disconnected
                        break;
                    }
                    Some(Err(err)) => {
                        tracing::debug!("WebSocket receive error: {err}");
                        break;
                    }
                    // Ignore binary, ping, pong protocol frames (handled by axum/tungstenite)
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.registry.unregister(connection_id);
    tracing::debug!(connection_id = %connection_id, "WebSocket connection closed");
}
