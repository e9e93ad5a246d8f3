use serde::{Deserialize, Serialize};

use crate::agent::InvocationType;

/// Where the chat agent function lives and how it is called.
///
/// These values are fixed for the life of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_function_name")]
    pub function_name: String,

    #[serde(default)]
    pub invocation_type: InvocationType,

    /// Overrides the regional endpoint, e.g. a local emulator.
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_function_name() -> String {
    "chat-agent".to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            function_name: default_function_name(),
            invocation_type: InvocationType::default(),
            endpoint: None,
        }
    }
}
