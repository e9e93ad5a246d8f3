use std::sync::Arc;

use crate::agent::ChatAgentService;
use crate::config_manager::Config;
use crate::conversations::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub agent: Arc<ChatAgentService>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let agent = ChatAgentService::from_config(&config.agent_config);
        Self::with_agent(config, agent)
    }

    pub fn with_agent(config: Config, agent: ChatAgentService) -> Self {
        let sessions = Arc::new(SessionStore::new(config.chat_config.clone()));
        Self {
            config,
            agent: Arc::new(agent),
            sessions,
        }
    }
}
