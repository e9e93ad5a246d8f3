use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::conversations::{submit_query, ChatError, SessionError, SessionSnapshot};
use crate::state::AppState;

type ApiError = (StatusCode, Json<Value>);

/// Full application router with middleware and state attached.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // WebSocket
        .route("/client-ws", get(websocket_handler))
        // Health check
        .route("/api/health", get(health_check))
        // REST API routes
        .route("/api/chat-config", get(get_chat_config))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/messages", post(post_message))
        .route("/api/sessions/:id/clear", post(clear_session))
        .route("/api/sessions/:id/settings", put(update_settings))
}

#[derive(Debug, Deserialize)]
struct MessageRequest {
    query: String,
    model: Option<String>,
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct SettingsRequest {
    model: Option<String>,
    temperature: Option<f32>,
}

fn api_error(status: StatusCode, message: impl std::fmt::Display) -> ApiError {
    (status, Json(json!({ "error": message.to_string() })))
}

fn session_error(err: SessionError) -> ApiError {
    let status = match err {
        SessionError::NotFound(_) => StatusCode::NOT_FOUND,
        SessionError::InvalidModel(_) | SessionError::InvalidTemperature(_) => {
            StatusCode::BAD_REQUEST
        }
    };
    api_error(status, err)
}

fn chat_error(err: ChatError) -> ApiError {
    match err {
        ChatError::Session(e) => session_error(e),
        ChatError::Agent(e) => {
            error!("Agent invocation failed: {}", e);
            api_error(StatusCode::BAD_GATEWAY, e)
        }
    }
}

async fn websocket_handler(
    ws: axum::extract::ws::WebSocketUpgrade,
    State(state): State<AppState>,
) -> axum::response::Response {
    crate::websocket::websocket_handler(ws, State(state)).await
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_chat_config(State(state): State<AppState>) -> Json<Value> {
    let chat = state.sessions.chat_config();
    Json(json!({
        "models": chat.models,
        "default_model": chat.default_model(),
        "default_temperature": chat.default_temperature,
        "hello_message": chat.hello_message,
    }))
}

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionSnapshot>) {
    (StatusCode::CREATED, Json(state.sessions.create()))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    state.sessions.get(&id).map(Json).map_err(session_error)
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(&id).map_err(session_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<MessageRequest>,
) -> Result<Json<Value>, ApiError> {
    apply_settings(&state, &id, payload.model.as_deref(), payload.temperature)?;

    let turn = submit_query(&state.sessions, &state.agent, &id, &payload.query)
        .await
        .map_err(chat_error)?
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "query must not be blank"))?;

    let history = state.sessions.get(&id).map_err(session_error)?;
    Ok(Json(json!({
        "turn": turn.view(),
        "history": history,
    })))
}

async fn clear_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    state.sessions.clear(&id).map(Json).map_err(session_error)
}

async fn update_settings(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SettingsRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    apply_settings(&state, &id, payload.model.as_deref(), payload.temperature)?;
    state.sessions.get(&id).map(Json).map_err(session_error)
}

fn apply_settings(
    state: &AppState,
    id: &str,
    model: Option<&str>,
    temperature: Option<f32>,
) -> Result<(), ApiError> {
    if let Some(model) = model {
        state.sessions.select_model(id, model).map_err(session_error)?;
    }
    if let Some(temperature) = temperature {
        state
            .sessions
            .set_temperature(id, temperature)
            .map_err(session_error)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::client::tests::{service_with, RecordingInvoker};
    use crate::config_manager::Config;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_with(invoker: Arc<RecordingInvoker>) -> (Router, AppState) {
        let state = AppState::with_agent(Config::default(), service_with(invoker));
        (build_app(state.clone()), state)
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn new_session(app: &Router) -> String {
        let (status, body) = call(app, Method::POST, "/api/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = app_with(RecordingInvoker::replying("{}"));
        let (status, body) = call(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn chat_config_lists_models() {
        let (app, _) = app_with(RecordingInvoker::replying("{}"));
        let (_, body) = call(&app, Method::GET, "/api/chat-config", None).await;
        assert_eq!(body["models"], json!(["Model 1", "Model 2", "Model 3"]));
        assert_eq!(body["default_model"], "Model 1");
    }

    #[tokio::test]
    async fn message_round_trip_appends_turn() {
        let invoker = RecordingInvoker::replying(r#"{"body": "{\"answer\": \"costs $5\"}"}"#);
        let (app, _) = app_with(invoker.clone());
        let id = new_session(&app).await;

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/messages"),
            Some(json!({"query": "price?", "model": "Model 2", "temperature": 0.1})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["turn"]["assistant"], "costs &#36;5");
        assert_eq!(body["history"]["turns"].as_array().unwrap().len(), 2);
        assert_eq!(body["history"]["model"], "Model 2");
        assert_eq!(
            invoker.payloads(),
            vec![json!({"query": "price?", "model": "Model 2"})]
        );
    }

    #[tokio::test]
    async fn blank_message_is_bad_request() {
        let invoker = RecordingInvoker::replying("{}");
        let (app, _) = app_with(invoker.clone());
        let id = new_session(&app).await;

        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/messages"),
            Some(json!({"query": "  "})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn agent_failure_is_bad_gateway() {
        let (app, state) = app_with(RecordingInvoker::failing());
        let id = new_session(&app).await;

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/messages"),
            Some(json!({"query": "hello"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("transport"));
        assert_eq!(state.sessions.get(&id).unwrap().turns.len(), 1);
    }

    #[tokio::test]
    async fn clear_and_delete_lifecycle() {
        let invoker = RecordingInvoker::replying(r#"{"body": {"answer": "a"}}"#);
        let (app, state) = app_with(invoker);
        let id = new_session(&app).await;
        call(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/messages"),
            Some(json!({"query": "q"})),
        )
        .await;

        let (status, body) = call(&app, Method::POST, &format!("/api/sessions/{id}/clear"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["turns"].as_array().unwrap().len(), 1);

        let (status, _) = call(&app, Method::DELETE, &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(state.sessions.len(), 0);

        let (status, _) = call(&app, Method::GET, &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn settings_validate_model_and_temperature() {
        let (app, _) = app_with(RecordingInvoker::replying("{}"));
        let id = new_session(&app).await;
        let uri = format!("/api/sessions/{id}/settings");

        let (status, _) = call(&app, Method::PUT, &uri, Some(json!({"model": "GPT-X"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, Method::PUT, &uri, Some(json!({"temperature": 2.0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(
            &app,
            Method::PUT,
            &uri,
            Some(json!({"model": "Model 3", "temperature": 1.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"], "Model 3");
        assert_eq!(body["temperature"], 1.0);
    }
}
