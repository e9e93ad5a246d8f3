use axum::extract::ws::Message;
use futures_util::{Sink, SinkExt};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::conversations::{submit_query, SessionSnapshot};
use crate::state::AppState;

/// Dispatch one client message for `session_id`.
///
/// Session and agent failures are reported to the client as `error`
/// messages; only a failure to parse or to send is returned.
pub async fn handle_message<S>(
    state: &AppState,
    session_id: &str,
    text: &str,
    sender: &mut S,
) -> anyhow::Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let msg: Value = serde_json::from_str(text)?;
    let msg_type = msg.get("type").and_then(|v| v.as_str());

    match msg_type {
        Some("text-input") => handle_text_input(state, session_id, &msg, sender).await?,
        Some("clear-chat") => handle_clear(state, session_id, sender).await?,
        Some("set-model") => handle_set_model(state, session_id, &msg, sender).await?,
        Some("set-temperature") => {
            handle_set_temperature(state, session_id, &msg, sender).await?
        }
        Some("fetch-history") => handle_fetch_history(state, session_id, sender).await?,
        Some("fetch-chat-config") => {
            send_json(sender, chat_config_message(state)).await?;
        }
        _ => {
            warn!("Unknown message type: {:?}", msg_type);
        }
    }

    Ok(())
}

pub fn session_created_message(state: &AppState, snapshot: &SessionSnapshot) -> Value {
    json!({
        "type": "session-created",
        "session_id": snapshot.session_id,
        "model": snapshot.model,
        "temperature": snapshot.temperature,
        "models": state.sessions.chat_config().models,
    })
}

pub fn history_message(snapshot: &SessionSnapshot) -> Value {
    json!({
        "type": "history",
        "turns": snapshot.turns,
    })
}

fn chat_config_message(state: &AppState) -> Value {
    let chat = state.sessions.chat_config();
    json!({
        "type": "chat-config",
        "models": chat.models,
        "default_temperature": chat.default_temperature,
        "hello_message": chat.hello_message,
    })
}

fn settings_message(snapshot: &SessionSnapshot) -> Value {
    json!({
        "type": "settings",
        "model": snapshot.model,
        "temperature": snapshot.temperature,
    })
}

fn error_message(message: impl std::fmt::Display) -> Value {
    json!({
        "type": "error",
        "message": message.to_string(),
    })
}

async fn send_json<S>(sender: &mut S, value: Value) -> anyhow::Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    sender.send(Message::Text(value.to_string())).await?;
    Ok(())
}

async fn handle_text_input<S>(
    state: &AppState,
    session_id: &str,
    msg: &Value,
    sender: &mut S,
) -> anyhow::Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let text = msg.get("text").and_then(|v| v.as_str()).unwrap_or("");
    if text.trim().is_empty() {
        debug!("Ignoring blank text input for session {}", session_id);
        return Ok(());
    }

    send_json(sender, json!({"type": "control", "text": "thinking-start"})).await?;

    match submit_query(&state.sessions, &state.agent, session_id, text).await {
        Ok(Some(turn)) => {
            let view = turn.view();
            send_json(
                sender,
                json!({
                    "type": "full-text",
                    "text": view.assistant,
                    "turn": view,
                }),
            )
            .await?;
        }
        Ok(None) => {}
        Err(e) => {
            warn!("Chat query failed for session {}: {}", session_id, e);
            send_json(sender, error_message(e)).await?;
        }
    }

    send_json(sender, json!({"type": "control", "text": "thinking-end"})).await?;
    Ok(())
}

async fn handle_clear<S>(state: &AppState, session_id: &str, sender: &mut S) -> anyhow::Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let reply = match state.sessions.clear(session_id) {
        Ok(snapshot) => history_message(&snapshot),
        Err(e) => error_message(e),
    };
    send_json(sender, reply).await
}

async fn handle_set_model<S>(
    state: &AppState,
    session_id: &str,
    msg: &Value,
    sender: &mut S,
) -> anyhow::Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let Some(model) = msg.get("model").and_then(|v| v.as_str()) else {
        return send_json(sender, error_message("model is required")).await;
    };
    let reply = match state
        .sessions
        .select_model(session_id, model)
        .and_then(|_| state.sessions.get(session_id))
    {
        Ok(snapshot) => settings_message(&snapshot),
        Err(e) => error_message(e),
    };
    send_json(sender, reply).await
}

async fn handle_set_temperature<S>(
    state: &AppState,
    session_id: &str,
    msg: &Value,
    sender: &mut S,
) -> anyhow::Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let Some(temperature) = msg.get("temperature").and_then(|v| v.as_f64()) else {
        return send_json(sender, error_message("temperature is required")).await;
    };
    let reply = match state
        .sessions
        .set_temperature(session_id, temperature as f32)
        .and_then(|_| state.sessions.get(session_id))
    {
        Ok(snapshot) => settings_message(&snapshot),
        Err(e) => error_message(e),
    };
    send_json(sender, reply).await
}

async fn handle_fetch_history<S>(
    state: &AppState,
    session_id: &str,
    sender: &mut S,
) -> anyhow::Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let reply = match state.sessions.get(session_id) {
        Ok(snapshot) => history_message(&snapshot),
        Err(e) => error_message(e),
    };
    send_json(sender, reply).await
}
