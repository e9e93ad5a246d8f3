use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::error::AgentError;

/// Body sent to the remote function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub query: String,
    pub model: String,
}

/// Unwrapped result handed back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub answer: String,
}

/// How the remote function is invoked.
///
/// Only the synchronous mode exists: the caller waits for the function to
/// finish and receives its result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationType {
    #[default]
    RequestResponse,
}

impl InvocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationType::RequestResponse => "RequestResponse",
        }
    }
}

impl std::fmt::Display for InvocationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw result of one remote invocation.
#[derive(Debug, Clone)]
pub struct InvocationOutput {
    pub status_code: u16,
    /// Set when the function itself raised (`Handled` / `Unhandled`).
    pub function_error: Option<String>,
    pub executed_version: Option<String>,
    pub payload: Vec<u8>,
}

#[cfg(test)]
impl InvocationOutput {
    /// A plain 200 response carrying `payload`.
    pub fn ok(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            status_code: 200,
            function_error: None,
            executed_version: None,
            payload: payload.into(),
        }
    }
}

/// Decode a response payload into an [`AgentResponse`].
///
/// The payload must be UTF-8 JSON. Its `body` may be a mapping or a
/// JSON-encoded string of one; both are accepted. Anything else about the
/// shape falls back to an empty answer.
pub fn parse_agent_response(payload: &[u8]) -> Result<AgentResponse, AgentError> {
    let text = std::str::from_utf8(payload)?;
    let content: Value = serde_json::from_str(text).map_err(AgentError::Decode)?;

    let body = match content.get("body") {
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!("Agent response body is a string but not JSON: {}", e);
                Value::Object(Map::new())
            }
        },
        Some(body) => body.clone(),
        None => {
            debug!("Agent response has no body field");
            Value::Object(Map::new())
        }
    };

    let answer = match body.get("answer") {
        Some(Value::String(answer)) => answer.clone(),
        Some(other) => {
            debug!("Agent response answer is not a string: {}", other);
            String::new()
        }
        None => String::new(),
    };

    Ok(AgentResponse { answer })
}
