use serde::{Deserialize, Serialize};

use crate::config_manager::agent::AgentConfig;
use crate::config_manager::chat::ChatConfig;
use crate::config_manager::system::SystemConfig;

/// Main configuration for the application using JSON-LD format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "@context")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,

    #[serde(default)]
    pub system_config: SystemConfig,

    #[serde(default)]
    pub agent_config: AgentConfig,

    #[serde(default)]
    pub chat_config: ChatConfig,
}

impl Config {
    /// Load configuration from a JSON-LD or YAML file
    pub fn load(path: &str) -> anyhow::Result<Self> {
        use crate::config_manager::utils::{read_config_file, validate_config};
        let value = read_config_file(path)?;
        validate_config(&value)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.chat_config.validate()?;
        Ok(())
    }
}
