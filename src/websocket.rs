use axum::extract::ws::WebSocket;
use axum::{
    extract::{ws::Message, State, WebSocketUpgrade},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{error, info};

use crate::handlers;
use crate::state::AppState;

pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// One connection is one chat session: it is created here and removed when
/// the socket closes.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let snapshot = state.sessions.create();
    let session_id = snapshot.session_id.clone();
    info!("New WebSocket connection for session {}", session_id);

    let (mut sender, mut receiver) = socket.split();

    let initial_messages = vec![
        handlers::session_created_message(&state, &snapshot),
        handlers::history_message(&snapshot),
    ];

    let mut connected = true;
    for msg in initial_messages {
        if let Err(e) = sender.send(Message::Text(msg.to_string())).await {
            error!("Failed to send initial message: {}", e);
            connected = false;
            break;
        }
    }

    while connected {
        let Some(msg) = receiver.next().await else {
            break;
        };
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(e) =
                    handlers::handle_message(&state, &session_id, &text, &mut sender).await
                {
                    error!("Error handling message: {}", e);
                }
            }
            Ok(Message::Close(_)) => {
                info!("Session {} disconnected", session_id);
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    if let Err(e) = state.sessions.remove(&session_id) {
        error!("Failed to remove session {}: {}", session_id, e);
    }
    info!(
        "Cleaned up session {} ({} active)",
        session_id,
        state.sessions.len()
    );
}
