// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket surface of the event router.
//!
//! Client -> Server (JSON):
//! ```json
//! {"type": "authenticate", "token": "<userId>.<role>.<sig>"}
//! {"type": "join_complaint", "complaintId": "CMP000001"}
//! {"type": "leave_complaint", "complaintId": "CMP000001"}
//! ```
//!
//! Server -> Client (JSON):
//! ```json
//! {"event": "message.sent", "room": "complaint:CMP000001", "data": {...}}
//! {"reply": "join_complaint", "ok": true}
//! {"reply": "join_complaint", "ok": false, "error": "...", "kind": "access_denied"}
//! ```

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use resolvenow_bus::ConnectionId;
use resolvenow_core::{ComplaintId, Identity, ResolveError};

use crate::server::GatewayState;

#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    #[serde(default)]
    pub token: Option<String>,
}

/// Message from client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Authenticate {
        token: String,
    },
    JoinComplaint {
        #[serde(rename = "complaintId")]
        complaint_id: String,
    },
    LeaveComplaint {
        #[serde(rename = "complaintId")]
        complaint_id: String,
    },
}

impl ClientMessage {
    fn action(&self) -> &'static str {
        match self {
            ClientMessage::Authenticate { .. } => "authenticate",
            ClientMessage::JoinComplaint { .. } => "join_complaint",
            ClientMessage::LeaveComplaint { .. } => "leave_complaint",
        }
    }
}

/// Acknowledgement of one client message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerReply {
    pub reply: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ServerReply {
    fn ok(action: &str) -> Self {
        Self {
            reply: action.to_string(),
            ok: true,
            error: None,
            kind: None,
        }
    }

    fn failed(action: &str, err: &ResolveError) -> Self {
        Self {
            reply: action.to_string(),
            ok: false,
            error: Some(err.to_string()),
            kind: Some(err.kind().to_string()),
        }
    }
}

/// WebSocket upgrade handler.
///
/// A `token` query parameter authenticates the session up front; an
/// invalid one is refused before the upgrade.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<GatewayState>,
) -> Result<Response, StatusCode> {
    let identity = match params.token.as_deref() {
        Some(token) => Some(state.auth.identify(token).ok_or(StatusCode::UNAUTHORIZED)?),
        None => None,
    };
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, identity)))
}

/// Applies one client message to the session and builds the reply.
pub async fn dispatch(state: &GatewayState, conn: ConnectionId, msg: ClientMessage) -> ServerReply {
    let action = msg.action();
    let result = match msg {
        ClientMessage::Authenticate { token } => match state.auth.identify(&token) {
            Some(identity) => state.service.router().authenticate(conn, identity),
            None => Err(ResolveError::AccessDenied("invalid token".into())),
        },
        ClientMessage::JoinComplaint { complaint_id } => {
            match complaint_id.parse::<ComplaintId>() {
                Ok(id) => state.service.join_complaint_room(conn, &id).await,
                Err(e) => Err(e),
            }
        }
        ClientMessage::LeaveComplaint { complaint_id } => complaint_id
            .parse::<ComplaintId>()
            .map(|id| state.service.leave_complaint_room(conn, &id)),
    };
    match result {
        Ok(()) => ServerReply::ok(action),
        Err(e) => {
            tracing::debug!(%conn, action, error = %e, "socket action refused");
            ServerReply::failed(action, &e)
        }
    }
}

/// Handle an individual WebSocket connection.
///
/// A sender task forwards routed events and replies to the client while
/// this task reads client messages. Disconnect removes the session from
/// every room.
async fn handle_socket(socket: WebSocket, state: GatewayState, identity: Option<Identity>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let router = state.service.router().clone();
    let (conn, mut events) = router.connect();
    if let Some(identity) = identity
        && let Err(e) = router.authenticate(conn, identity)
    {
        tracing::warn!(%conn, error = %e, "failed to bind socket identity");
    }

    let (reply_tx, mut reply_rx) = mpsc::channel::<String>(16);

    let sender_task = tokio::spawn(async move {
        loop {
            let text = tokio::select! {
                Some(event) = events.recv() => match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!("failed to encode event: {e}");
                        continue;
                    }
                },
                Some(reply) = reply_rx.recv() => reply,
                else => break,
            };
            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Text(text) => {
                let text_str: &str = &text;
                let reply = match serde_json::from_str::<ClientMessage>(text_str) {
                    Ok(msg) => dispatch(&state, conn, msg).await,
                    Err(e) => {
                        tracing::warn!("invalid WebSocket message: {e}");
                        ServerReply::failed(
                            "unknown",
                            &ResolveError::Validation(format!("invalid message: {e}")),
                        )
                    }
                };
                match serde_json::to_string(&reply) {
                    Ok(json) => {
                        if reply_tx.send(json).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("failed to encode reply: {e}"),
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    router.disconnect(conn);
    sender_task.abort();
    tracing::debug!(%conn, "socket closed");
}
