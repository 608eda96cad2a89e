//! # Connection Gateway
//!
//! `GET /api/ws/chat` upgrades to a WebSocket bound to one authenticated user.
//!
//! ## Lifecycle
//!
//! 1. The credential token is checked before the upgrade. Failure answers `401`
//!    and nothing else happens.
//! 2. A fresh [`ConnectionHandle`] is registered in presence (replacing any
//!    previous connection of the same user) and recorded on the user row.
//! 3. A writer task drains the connection's outbound queue into the socket; the
//!    reader loop decodes frames and runs intents one at a time.
//! 4. When either side stops, the presence entry and the stored handle are
//!    cleared, but only if they still belong to this connection.
//!
//! ## Frames
//!
//! ```javascript
//! const ws = new WebSocket(`ws://localhost:3001/api/ws/chat?token=${jwt}`);
//! ws.send(JSON.stringify({ event: "sendMessage", data: { receiverPhone: "555-2", text: "hi" } }));
//! ```

use super::handlers::utils::{authenticate, extract_token};
use crate::chat::presence::ConnectionHandle;
use crate::chat::state::ChatAppState;
use axum::extract::ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use lib_core::dto::{ClientEvent, ServerEvent};
use lib_core::model::store::UserRepository;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct WsAuthQuery {
    pub token: Option<String>,
}

/// WebSocket handler for the live chat connection.
///
/// **Route**: `GET /api/ws/chat?token=<jwt>` (or `Authorization: Bearer <jwt>`)
pub async fn chat_websocket(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    headers: HeaderMap,
    Query(query): Query<WsAuthQuery>,
    State(app_state): State<Arc<ChatAppState>>,
) -> Response {
    let token = extract_token(&headers, query.token.as_deref());
    let user_id = match authenticate(token, &app_state.config) {
        Ok(user_id) => user_id,
        Err(status) => {
            warn!("[WS] CONNECT_REJECTED - authentication failed");
            return status.into_response();
        }
    };

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            warn!(user_id, "[WS] CONNECT_REJECTED - not a WebSocket upgrade");
            return rejection.into_response();
        }
    };

    info!(user_id, "[WS] UPGRADE_START user_id={}", user_id);

    ws.on_upgrade(move |socket| run_session(socket, user_id, app_state))
        .into_response()
}

/// Drive one live connection until either side stops.
async fn run_session(socket: WebSocket, user_id: i64, app_state: Arc<ChatAppState>) {
    let (tx, rx) = mpsc::unbounded_channel::<ServerEvent>();
    let handle = ConnectionHandle::new(tx);
    let connection_id = handle.id;

    open_session(&app_state, user_id, handle.clone()).await;

    let (mut sender, mut receiver) = socket.split();

    // Writer: outbound queue -> socket
    let mut send_task = tokio::spawn(async move {
        let mut events = UnboundedReceiverStream::new(rx);
        while let Some(event) = events.next().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    error!(connection_id = %connection_id, error = %e, "[WS] SERIALIZE_ERROR");
                    continue;
                }
            };

            if let Err(e) = sender.send(Message::Text(json.into())).await {
                debug!(connection_id = %connection_id, error = %e, "[WS] SEND_FAILED - closing writer");
                break;
            }
        }
    });

    // Sends racing this flush may be queued ahead of older backlog; clients order by createdAt
    if app_state.config.flush_backlog_on_connect {
        if let Err(e) = app_state.engine.flush_backlog(user_id).await {
            error!(user_id, error = %e, "[WS] backlog flush failed");
        }
    }

    // Reader: socket -> intents, one at a time
    let reader_state = Arc::clone(&app_state);
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    handle_frame(&reader_state, user_id, &handle, text.as_str()).await;
                }
                Ok(Message::Close(_)) => {
                    debug!(user_id, "[WS] CLOSE_FRAME received");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(user_id, error = %e, "[WS] RECEIVE_ERROR");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    close_session(&app_state, user_id, connection_id).await;
}

async fn open_session(app_state: &ChatAppState, user_id: i64, handle: ConnectionHandle) {
    let connection_id = handle.id;

    if let Some(displaced) = app_state.presence.register(user_id, handle).await {
        info!(
            user_id,
            displaced = %displaced.id,
            "[WS] previous connection replaced"
        );
    }

    if let Err(e) =
        UserRepository::update_live_connection(&app_state.db, user_id, Some(&connection_id.to_string())).await
    {
        error!(user_id, error = %e, "[WS] failed to record live connection");
    }

    let online = app_state.presence.online_count().await;
    info!(
        user_id,
        connection_id = %connection_id,
        online,
        "[WS] CONNECTED user_id={} connection_id={}",
        user_id,
        connection_id
    );
}

async fn close_session(app_state: &ChatAppState, user_id: i64, connection_id: Uuid) {
    let released = app_state.presence.release(user_id, connection_id).await;

    if let Err(e) =
        UserRepository::clear_live_connection_if(&app_state.db, user_id, &connection_id.to_string()).await
    {
        error!(user_id, error = %e, "[WS] failed to clear live connection");
    }

    info!(
        user_id,
        connection_id = %connection_id,
        released,
        "[WS] DISCONNECTED user_id={} connection_id={}",
        user_id,
        connection_id
    );
}

/// Decode and run one inbound frame. Failures never close the connection.
async fn handle_frame(app_state: &ChatAppState, user_id: i64, handle: &ConnectionHandle, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(user_id, error = %e, "[WS] UNDECODABLE_FRAME ignored");
            return;
        }
    };

    let intent = event.name();
    debug!(user_id, intent, "[WS] intent received");

    let result = match event.validate() {
        Ok(()) => app_state.engine.handle(user_id, event).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        warn!(user_id, intent, code = e.code(), error = %e, "[WS] INTENT_FAILED");
        handle.send(ServerEvent::intent_failed(intent, &e));
    }
}
