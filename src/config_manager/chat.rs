use serde::{Deserialize, Serialize};

/// Chat page settings: selectable models, default temperature and the
/// greeting turn every session starts with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    #[serde(default = "default_hello_message")]
    pub hello_message: String,

    #[serde(default = "default_greeting_human_message")]
    pub greeting_human_message: String,
}

fn default_models() -> Vec<String> {
    vec![
        "Model 1".to_string(),
        "Model 2".to_string(),
        "Model 3".to_string(),
    ]
}

fn default_temperature() -> f32 {
    0.5
}

fn default_hello_message() -> String {
    "Hi! I am an AI assistant. How can I help you?".to_string()
}

fn default_greeting_human_message() -> String {
    "Hi".to_string()
}

pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 1.0;

pub fn is_valid_temperature(temperature: f32) -> bool {
    temperature.is_finite() && (MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature)
}

impl ChatConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.models.is_empty() {
            anyhow::bail!("chat_config.models must list at least one model");
        }
        if !is_valid_temperature(self.default_temperature) {
            anyhow::bail!(
                "chat_config.default_temperature must be within [{}, {}], got {}",
                MIN_TEMPERATURE,
                MAX_TEMPERATURE,
                self.default_temperature
            );
        }
        Ok(())
    }

    pub fn default_model(&self) -> &str {
        self.models.first().map(|m| m.as_str()).unwrap_or_default()
    }

    pub fn has_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            models: default_models(),
            default_temperature: default_temperature(),
            hello_message: default_hello_message(),
            greeting_human_message: default_greeting_human_message(),
        }
    }
}
