//! Chat WebSocket handler.
//!
//! This module bridges one WebSocket connection to the [`ChatHub`].

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::chat::{ChatEvent, ChatHub, ConnectionId, ServerEvent, OUTBOX_CAPACITY};

use super::messages::ClientMessage;

/// WebSocket chat handler.
///
/// GET /ws
pub async fn chat_ws_handler(ws: WebSocketUpgrade, State(hub): State<Arc<ChatHub>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Handle a WebSocket connection until either side closes it.
async fn handle_socket(socket: WebSocket, hub: Arc<ChatHub>) {
    let connection_id = ConnectionId::new();
    let (outbox, mut events) = mpsc::channel::<ServerEvent>(OUTBOX_CAPACITY);
    hub.connect(connection_id, outbox).await;

    let (mut ws_sender, mut ws_receiver) = socket.split();

    loop {
        tokio::select! {
            // Handle incoming WebSocket messages
            msg_result = ws_receiver.next() => {
                match msg_result {
                    Some(Ok(Message::Text(text))) => {
                        match ClientMessage::parse(&text) {
                            Ok(client_msg) => {
                                hub.dispatch(connection_id, ChatEvent::from(client_msg)).await;
                            }
                            Err(e) => {
                                tracing::debug!(
                                    connection = %connection_id,
                                    "Ignoring malformed frame: {}",
                                    e
                                );
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!("WebSocket closed by client: {}", connection_id);
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!("WebSocket error on {}: {}", connection_id, e);
                        break;
                    }
                }
            }

            // Deliver queued events
            Some(event) = events.recv() => {
                if !send_event(&mut ws_sender, &event).await {
                    break;
                }
            }
        }
    }

    hub.disconnect(connection_id).await;
    tracing::debug!("WebSocket session ended: {}", connection_id);
}

/// Serialize and send one event. Returns false if the socket is gone.
async fn send_event(
    ws_sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> bool {
    match serde_json::to_string(event) {
        Ok(json) => ws_sender.send(Message::Text(json)).await.is_ok(),
        Err(e) => {
            tracing::warn!("Failed to serialize event: {}", e);
            true
        }
    }
}
