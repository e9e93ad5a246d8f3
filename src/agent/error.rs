use thiserror::Error;

/// Errors surfaced by the agent client.
///
/// Only transport-level and outer-decode failures are errors. A response
/// whose `body` or `answer` is missing or malformed is not an error; it
/// degrades to an empty answer.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The remote function could not be reached or the connection failed.
    #[error("transport error invoking remote function: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The function service answered with a non-success status.
    #[error("remote function service returned {status}: {message}")]
    Service { status: u16, message: String },

    /// The request payload could not be serialized.
    #[error("failed to encode agent request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response payload is not UTF-8 text.
    #[error("agent response payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The response payload is not valid JSON.
    #[error("agent response payload is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        AgentError::Transport(Box::new(err))
    }
}
