use thiserror::Error;
use tracing::info;

use crate::agent::{AgentError, ChatAgentService};
use crate::conversations::session::{SessionError, SessionStore};
use crate::conversations::types::ConversationTurn;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// Run one chat query for a session.
///
/// Blank input is ignored: no remote call is made and nothing is recorded.
/// Otherwise the agent is asked with the session's selected model and the
/// resulting turn is appended. A failed agent call records nothing.
pub async fn submit_query(
    store: &SessionStore,
    agent: &ChatAgentService,
    session_id: &str,
    query: &str,
) -> Result<Option<ConversationTurn>, ChatError> {
    let model = store.selected_model(session_id)?;

    if query.trim().is_empty() {
        info!("Ignoring blank query for session {}", session_id);
        return Ok(None);
    }

    info!("Session {} asking {} via {}", session_id, model, agent.function_name());
    let answer = agent.invoke(query, &model).await?;

    let turn = ConversationTurn::new(query, answer);
    store.append_turn(session_id, turn.clone())?;
    Ok(Some(turn))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::client::tests::{service_with, RecordingInvoker};
    use crate::config_manager::chat::ChatConfig;

    #[tokio::test]
    async fn appends_turn_with_agent_answer() {
        let store = SessionStore::new(ChatConfig::default());
        let id = store.create().session_id;
        store.select_model(&id, "Model 3").unwrap();
        let invoker = RecordingInvoker::replying(r#"{"body": {"answer": "42"}}"#);
        let agent = service_with(invoker.clone());

        let turn = submit_query(&store, &agent, &id, "meaning of life?")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(turn.human, "meaning of life?");
        assert_eq!(turn.assistant, "42");
        assert_eq!(
            invoker.payloads(),
            vec![serde_json::json!({"query": "meaning of life?", "model": "Model 3"})]
        );
        assert_eq!(store.get(&id).unwrap().turns.len(), 2);
    }

    #[tokio::test]
    async fn blank_query_makes_no_call() {
        let store = SessionStore::new(ChatConfig::default());
        let id = store.create().session_id;
        let invoker = RecordingInvoker::replying(r#"{"body": {"answer": "unused"}}"#);
        let agent = service_with(invoker.clone());

        assert!(submit_query(&store, &agent, &id, "   ").await.unwrap().is_none());
        assert!(submit_query(&store, &agent, &id, "").await.unwrap().is_none());

        assert_eq!(invoker.call_count(), 0);
        assert_eq!(store.get(&id).unwrap().turns.len(), 1);
    }

    #[tokio::test]
    async fn agent_failure_records_nothing() {
        let store = SessionStore::new(ChatConfig::default());
        let id = store.create().session_id;
        let agent = service_with(RecordingInvoker::failing());

        let err = submit_query(&store, &agent, &id, "hello").await.unwrap_err();

        assert!(matches!(err, ChatError::Agent(AgentError::Transport(_))));
        assert_eq!(store.get(&id).unwrap().turns.len(), 1);
    }

    #[tokio::test]
    async fn unknown_session_is_rejected_before_calling() {
        let store = SessionStore::new(ChatConfig::default());
        let invoker = RecordingInvoker::replying("{}");
        let agent = service_with(invoker.clone());

        let err = submit_query(&store, &agent, "nope", "hello").await.unwrap_err();

        assert!(matches!(err, ChatError::Session(SessionError::NotFound(_))));
        assert_eq!(invoker.call_count(), 0);
    }
}
