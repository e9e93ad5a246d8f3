use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::prepare_text_for_display;

/// One human message paired with the assistant's reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub human: String,
    pub assistant: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(human: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            human: human.into(),
            assistant: assistant.into(),
            timestamp: Utc::now(),
        }
    }

    /// The turn as the chat view shows it.
    pub fn view(&self) -> TurnView {
        TurnView {
            human: prepare_text_for_display(&self.human),
            assistant: prepare_text_for_display(&self.assistant),
            timestamp: self.timestamp,
        }
    }
}

/// Display-ready copy of a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnView {
    pub human: String,
    pub assistant: String,
    pub timestamp: DateTime<Utc>,
}

/// Point-in-time copy of a session, safe to hand out without holding locks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub model: String,
    pub temperature: f32,
    pub created_at: DateTime<Utc>,
    pub turns: Vec<TurnView>,
}
