use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, error, info, instrument, warn};

use super::{ClientMessage, ConnectionId, ServerMessage};
use crate::{chat::services::send_message, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_upgrade))
}

#[instrument(skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_socket(socket, state))
}

async fn serve_socket(socket: WebSocket, state: AppState) {
    let relay = state.relay.clone();
    let (conn, mut outbox) = relay.connect();
    info!(connection = %conn, "client connected");

    let (mut sink, mut stream) = socket.split();
    let send_timeout = state.config.relay.send_timeout();

    // Writer: drains the outbox. Ends when the relay drops the connection or a
    // write fails / stalls past the send timeout.
    let writer_relay = relay.clone();
    let mut writer = tokio::spawn(async move {
        while let Some(frame) = outbox.recv().await {
            let text = match serde_json::to_string(&*frame) {
                Ok(t) => t,
                Err(e) => {
                    error!(connection = %conn, error = %e, "frame serialization failed");
                    continue;
                }
            };
            match tokio::time::timeout(send_timeout, sink.send(Message::Text(text))).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    debug!(connection = %conn, error = %e, "socket write failed");
                    break;
                }
                Err(_) => {
                    warn!(connection = %conn, "socket write timed out, dropping client");
                    break;
                }
            }
        }
        writer_relay.disconnect(conn);
        let _ = sink.close().await;
    });

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => handle_frame(&state, conn, &text).await,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(connection = %conn, error = %e, "socket read failed");
                    break;
                }
            },
            _ = &mut writer => break,
        }
    }

    relay.disconnect(conn);
    writer.abort();
    info!(connection = %conn, "client disconnected");
}

async fn handle_frame(state: &AppState, conn: ConnectionId, text: &str) {
    let reply = match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::JoinProject { project_id }) => {
            match state.relay.subscribe(conn, project_id) {
                Ok(_) => {
                    info!(connection = %conn, %project_id, "client joined project room");
                    Some(ServerMessage::Joined { project_id })
                }
                Err(e) => Some(ServerMessage::error(e.to_string())),
            }
        }
        // The sender sees its own message through the room broadcast.
        Ok(ClientMessage::SendMessage(request)) => {
            let sent = match request.validate() {
                Ok(command) => send_message(state, command).await,
                Err(e) => Err(e),
            };
            match sent {
                Ok(_) => None,
                Err(e) => {
                    warn!(connection = %conn, error = %e, "send_message rejected");
                    Some(ServerMessage::error(e.public_message()))
                }
            }
        }
        Err(e) => Some(ServerMessage::error(format!("malformed frame: {e}"))),
    };

    if let Some(reply) = reply {
        if let Err(e) = state.relay.send_to(conn, reply) {
            debug!(connection = %conn, error = %e, "reply not delivered");
        }
    }
}
