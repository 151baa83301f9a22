//! WebSocket connection handlers.
//!
//! One upgraded socket becomes one hub [`Connection`] plus two tasks: the
//! read loop forwards stamped frames to the hub, the write loop drains the
//! connection's outbox and keeps the peer alive with pings. When either
//! loop ends the other is aborted and the connection is unregistered.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;
use thiserror::Error;
use tokio::time::{Instant, sleep_until, timeout, timeout_at};

use crate::{
    domain::{RoomId, UserId},
    infrastructure::{
        dto::websocket::{InboundFrame, ProtocolError},
        hub::{
            Broadcast, Connection, ConnectionConfig, ConnectionId, HubHandle, Liveness, Origin,
            Outbox,
        },
    },
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectQuery {
    pub room_id: Option<String>,
    pub user_id: Option<String>,
}

/// Why the write loop stopped.
#[derive(Debug, Error)]
enum WriteError {
    #[error("write timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(#[from] axum::Error),
}

/// `GET /ws?roomId=..&userId=..`
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let room_id = query.room_id.map(RoomId::new);
    let user_id = query.user_id.map(UserId::new);
    let (Some(Ok(room_id)), Some(Ok(user_id))) = (room_id, user_id) else {
        tracing::warn!("Rejected WebSocket upgrade: roomId and userId are required");
        return Err(StatusCode::BAD_REQUEST);
    };

    let config = state.connection_config;
    Ok(ws
        .max_message_size(config.max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state, room_id, user_id)))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, room_id: RoomId, user_id: UserId) {
    let config = state.connection_config;
    let (connection, outbox) =
        Connection::open(room_id.clone(), user_id.clone(), config.send_queue_capacity);
    let connection_id = connection.id;

    if let Err(e) = state.hub.register(connection) {
        tracing::error!(room_id = %room_id, user_id = %user_id, "Failed to register connection: {}", e);
        return;
    }
    tracing::info!(
        room_id = %room_id,
        user_id = %user_id,
        connection_id = %connection_id,
        "Client connected"
    );

    let liveness = Arc::new(Liveness::new());
    let (sink, stream) = socket.split();

    let mut write_task = {
        let liveness = liveness.clone();
        tokio::spawn(async move {
            if let Err(e) = write_loop(sink, outbox, liveness, config).await {
                tracing::debug!(connection_id = %connection_id, "Write loop stopped: {}", e);
            }
        })
    };
    let mut read_task = tokio::spawn(read_loop(
        stream,
        state.hub.clone(),
        room_id.clone(),
        user_id.clone(),
        connection_id,
        liveness,
        config,
    ));

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut read_task => write_task.abort(),
        _ = &mut write_task => read_task.abort(),
    };

    if let Err(e) = state.hub.unregister(room_id.clone(), connection_id) {
        tracing::warn!(connection_id = %connection_id, "Failed to unregister connection: {}", e);
    }
    tracing::info!(
        room_id = %room_id,
        user_id = %user_id,
        connection_id = %connection_id,
        "Client disconnected"
    );
}

/// Forward inbound frames to the hub until the peer goes away or falls silent.
async fn read_loop(
    mut stream: SplitStream<WebSocket>,
    hub: HubHandle,
    room_id: RoomId,
    user_id: UserId,
    connection_id: ConnectionId,
    liveness: Arc<Liveness>,
    config: ConnectionConfig,
) {
    loop {
        let deadline = liveness.last_seen() + config.pong_wait;
        let message = match timeout_at(deadline, stream.next()).await {
            Ok(Some(Ok(message))) => message,
            Ok(Some(Err(e))) => {
                tracing::debug!(connection_id = %connection_id, "WebSocket read error: {}", e);
                break;
            }
            Ok(None) => break,
            Err(_) => {
                tracing::info!(connection_id = %connection_id, "Read deadline exceeded");
                break;
            }
        };
        liveness.touch();

        match message {
            Message::Text(text) => {
                let frame = match InboundFrame::parse(text.as_str(), &user_id) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::warn!(connection_id = %connection_id, "Dropped inbound frame: {}", e);
                        continue;
                    }
                };
                tracing::debug!(
                    room_id = %room_id,
                    user_id = %user_id,
                    message_type = %frame.message_type,
                    "Received frame"
                );

                let broadcast = Broadcast {
                    room_id: room_id.clone(),
                    payload: Arc::from(frame.to_payload()),
                    origin: Some(Origin {
                        connection_id,
                        user_id: user_id.clone(),
                        message_type: frame.message_type,
                        body: frame.body,
                    }),
                };
                if let Err(e) = hub.broadcast(broadcast) {
                    tracing::error!(connection_id = %connection_id, "Failed to forward frame: {}", e);
                    break;
                }
            }
            Message::Binary(_) => {
                tracing::warn!(
                    connection_id = %connection_id,
                    "Dropped inbound frame: {}",
                    ProtocolError::Binary
                );
            }
            Message::Close(_) => {
                tracing::debug!(connection_id = %connection_id, "Client requested close");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }
}

/// Drain the outbox into the socket and ping a quiet peer.
async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbox: Outbox,
    liveness: Arc<Liveness>,
    config: ConnectionConfig,
) -> Result<(), WriteError> {
    let mut last_ping = Instant::now();

    loop {
        let ping_at = liveness.last_seen().max(last_ping) + config.ping_period;

        tokio::select! {
            payload = outbox.recv() => {
                let Some(payload) = payload else {
                    // The hub dropped this connection.
                    let _ = timeout(config.write_wait, sink.send(Message::Close(None))).await;
                    return Ok(());
                };

                let mut batch = vec![payload];
                while let Ok(next) = outbox.try_recv() {
                    batch.push(next);
                }
                timeout(config.write_wait, async {
                    for payload in batch {
                        sink.feed(Message::Text(payload.as_ref().into())).await?;
                    }
                    sink.flush().await
                })
                .await
                .map_err(|_| WriteError::Timeout)??;
            }
            _ = sleep_until(ping_at) => {
                if liveness.idle_for() < config.ping_period {
                    continue;
                }
                timeout(config.write_wait, sink.send(Message::Ping(Default::default())))
                    .await
                    .map_err(|_| WriteError::Timeout)??;
                last_ping = Instant::now();
            }
        }
    }
}
