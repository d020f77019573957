//! WebSocket endpoint for room membership and timer sync.
//!
//! Each connection runs a reader loop (this task) and a writer task draining
//! the connection's outbox, so everything queued for a connection reaches it
//! in queue order. The connection ends when either side stops, including when
//! the registry cuts off a connection that fell too far behind.

use alloc::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt as _, StreamExt as _, stream::SplitSink};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    app::AppState,
    rooms::{
        ConnectionId, RoomRegistry, SyncKind,
        events::{Ack, ClientEvent, ClientFrame, ServerEvent},
    },
};

/// Gets called for every new client and spins up its event loop.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(AppState { rooms, .. }): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_connection(socket, rooms))
}

async fn send_ws_message(
    sink: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => sink.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!("Failed to serialize websocket message: {}", e);
            Err(axum::Error::new(e))
        }
    }
}

async fn drain_outbox(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbox: mpsc::Receiver<ServerEvent>,
    conn: ConnectionId,
) {
    while let Some(event) = outbox.recv().await {
        if let Err(e) = send_ws_message(&mut sink, &event).await {
            warn!(%conn, "Failed to send message, closing connection: {}", e);
            break;
        }
    }
}

/// Dispatches one decoded client frame.
async fn handle_frame(rooms: &RoomRegistry, conn: ConnectionId, frame: ClientFrame) {
    let ClientFrame { id, event } = frame;
    let result = match event {
        ClientEvent::RoomCreate(request) => Ok(rooms.create(conn, request.room_id.as_deref()).await),
        ClientEvent::RoomJoin(request) => {
            rooms
                .join(conn, request.room_id.as_deref().unwrap_or_default())
                .await
        }
        ClientEvent::RoomLeave(request) => {
            rooms
                .leave(conn, request.room_id.as_deref().unwrap_or_default())
                .await
        }
        ClientEvent::TimerSync(payload) => {
            rooms.relay(conn, SyncKind::TimerState, payload).await;
            return;
        }
        ClientEvent::TimerPenalty(payload) => {
            rooms.relay(conn, SyncKind::Penalty, payload).await;
            return;
        }
    };

    let ack = match result {
        Ok(membership) => Ack::success(id, membership),
        Err(e) => {
            debug!(%conn, "Rejected room event: {e}");
            Ack::failure(id, e.to_string())
        }
    };
    rooms.send(conn, ServerEvent::Ack(ack)).await;
}

/// We run one event loop per client.
async fn run_connection(socket: WebSocket, rooms: Arc<RoomRegistry>) {
    let (conn, outbox) = rooms.connect().await;
    let (sink, mut stream) = socket.split();
    let mut writer = tokio::spawn(drain_outbox(sink, outbox, conn));
    info!(%conn, "WebSocket connection opened");

    loop {
        tokio::select! {
            _ = &mut writer => {
                debug!(%conn, "Writer stopped");
                break;
            }
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => match ClientFrame::parse(text.as_str()) {
                    Ok(frame) => handle_frame(&rooms, conn, frame).await,
                    Err(e) => debug!(%conn, "Ignoring malformed frame: {e}"),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(%conn, "WebSocket receive failed: {e}");
                    break;
                }
            },
        }
    }

    let affected = rooms.disconnect(conn).await;
    writer.abort();
    info!(%conn, rooms = affected.len(), "WebSocket connection closed");
}
