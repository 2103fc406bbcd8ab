use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, info};
use types::ids::UserId;

/// Messages a client may send over the socket
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    Register { user_id: String },
    Ping,
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let mut registered: Option<(UserId, u64)> = None;

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                let Some(text) = outbound else { break };
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            inbound = receiver.next() => {
                let text = match inbound {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => continue,
                };

                match serde_json::from_str::<ClientMessage>(text.as_str()) {
                    Ok(ClientMessage::Register { user_id }) => {
                        let Some(user_id) = UserId::try_new(&user_id) else {
                            let _ = tx.send(error_frame("userId is required"));
                            continue;
                        };
                        if let Some((previous, connection_id)) = registered.take() {
                            state.connections.unregister(&previous, connection_id);
                        }
                        // Ack first so it precedes any event for this user
                        let _ = tx.send(json!({ "type": "REGISTERED", "userId": user_id }).to_string());
                        let connection_id = state.connections.register(user_id.clone(), tx.clone());
                        info!(%user_id, connection_id, "Client registered");
                        registered = Some((user_id, connection_id));
                    }
                    Ok(ClientMessage::Ping) => {
                        let _ = tx.send(json!({ "type": "PONG" }).to_string());
                    }
                    Err(err) => {
                        debug!(error = %err, "Unrecognized client message");
                        let _ = tx.send(error_frame("unrecognized message"));
                    }
                }
            }
        }
    }

    if let Some((user_id, connection_id)) = registered {
        state.connections.unregister(&user_id, connection_id);
        info!(%user_id, connection_id, "Client disconnected");
    }
}

fn error_frame(message: &str) -> String {
    json!({ "type": "ERROR", "message": message }).to_string()
}
