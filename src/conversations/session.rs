use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config_manager::chat::{is_valid_temperature, ChatConfig};
use crate::conversations::types::{ConversationTurn, SessionSnapshot};

#[derive(Error, Debug, PartialEq)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),

    #[error("unknown model: {0}")]
    InvalidModel(String),

    #[error("temperature must be within [0.0, 1.0], got {0}")]
    InvalidTemperature(f32),
}

/// Conversation state for one user session.
///
/// The first turn is always the greeting; history only grows by appending,
/// and clearing truncates back to the greeting.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: String,
    turns: Vec<ConversationTurn>,
    model: String,
    temperature: f32,
    created_at: DateTime<Utc>,
}

impl ChatSession {
    fn new(id: String, config: &ChatConfig) -> Self {
        Self {
            id,
            turns: vec![ConversationTurn::new(
                config.greeting_human_message.clone(),
                config.hello_message.clone(),
            )],
            model: config.default_model().to_string(),
            temperature: config.default_temperature,
            created_at: Utc::now(),
        }
    }

    fn push_turn(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    fn clear(&mut self) {
        self.turns.truncate(1);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            created_at: self.created_at,
            turns: self.turns.iter().map(ConversationTurn::view).collect(),
        }
    }
}

/// Process-local registry of live chat sessions.
///
/// Sessions are only touched through the named operations below. No map
/// guard escapes a method, so callers never hold one across an `.await`.
pub struct SessionStore {
    config: ChatConfig,
    sessions: DashMap<String, ChatSession>,
}

impl SessionStore {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            config,
            sessions: DashMap::new(),
        }
    }

    pub fn chat_config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn create(&self) -> SessionSnapshot {
        let id = Uuid::new_v4().to_string();
        let session = ChatSession::new(id.clone(), &self.config);
        let snapshot = session.snapshot();
        self.sessions.insert(id.clone(), session);
        info!("Created chat session {}", id);
        snapshot
    }

    pub fn get(&self, id: &str) -> Result<SessionSnapshot, SessionError> {
        self.sessions
            .get(id)
            .map(|s| s.snapshot())
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    pub fn selected_model(&self, id: &str) -> Result<String, SessionError> {
        self.sessions
            .get(id)
            .map(|s| s.model.clone())
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    pub fn select_model(&self, id: &str, model: &str) -> Result<(), SessionError> {
        if !self.config.has_model(model) {
            return Err(SessionError::InvalidModel(model.to_string()));
        }
        let mut session = self.get_mut(id)?;
        session.model = model.to_string();
        debug!("Session {} selected model {}", id, model);
        Ok(())
    }

    pub fn set_temperature(&self, id: &str, temperature: f32) -> Result<(), SessionError> {
        if !is_valid_temperature(temperature) {
            return Err(SessionError::InvalidTemperature(temperature));
        }
        let mut session = self.get_mut(id)?;
        session.temperature = temperature;
        debug!("Session {} set temperature {}", id, temperature);
        Ok(())
    }

    pub fn append_turn(&self, id: &str, turn: ConversationTurn) -> Result<(), SessionError> {
        self.get_mut(id)?.push_turn(turn);
        Ok(())
    }

    /// Drop every turn except the greeting.
    pub fn clear(&self, id: &str) -> Result<SessionSnapshot, SessionError> {
        let mut session = self.get_mut(id)?;
        session.clear();
        info!("Cleared chat session {}", id);
        Ok(session.snapshot())
    }

    pub fn remove(&self, id: &str) -> Result<(), SessionError> {
        self.sessions
            .remove(id)
            .map(|_| info!("Removed chat session {}", id))
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    fn get_mut(
        &self,
        id: &str,
    ) -> Result<dashmap::mapref::one::RefMut<'_, String, ChatSession>, SessionError> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }
}
