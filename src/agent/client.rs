use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::AgentError;
use super::invoker::{FunctionInvoker, LambdaHttpInvoker};
use super::types::{parse_agent_response, AgentRequest, InvocationType};
use crate::config_manager::agent::AgentConfig;

/// Synchronous request/response bridge to the remote chat agent function.
///
/// Holds only its fixed configuration, so one instance can be shared by
/// every session. Each call to [`ChatAgentService::invoke`] makes exactly one
/// remote invocation: no caching, no retry.
#[derive(Clone)]
pub struct ChatAgentService {
    invoker: Arc<dyn FunctionInvoker>,
    function_name: String,
    invocation_type: InvocationType,
}

impl ChatAgentService {
    pub fn new(
        invoker: Arc<dyn FunctionInvoker>,
        function_name: impl Into<String>,
        invocation_type: InvocationType,
    ) -> Self {
        Self {
            invoker,
            function_name: function_name.into(),
            invocation_type,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        let invoker = LambdaHttpInvoker::new(&config.region, config.endpoint.as_deref());
        info!(
            "Initialized ChatAgentService: function={}, region={}, endpoint={}",
            config.function_name,
            config.region,
            invoker.endpoint()
        );
        Self::new(
            Arc::new(invoker),
            config.function_name.clone(),
            config.invocation_type,
        )
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Ask the agent `query` using `model` and return its answer.
    ///
    /// An empty query is sent as is. A response without a usable `answer`
    /// yields an empty string; transport and outer decode failures are
    /// returned as errors.
    pub async fn invoke(&self, query: &str, model: &str) -> Result<String, AgentError> {
        let request = AgentRequest {
            query: query.to_string(),
            model: model.to_string(),
        };
        let payload = serde_json::to_string(&request).map_err(AgentError::Encode)?;

        let output = self
            .invoker
            .invoke(&self.function_name, self.invocation_type, payload)
            .await?;

        debug!(
            "Function {} answered with status {} (version {})",
            self.function_name,
            output.status_code,
            output.executed_version.as_deref().unwrap_or("unknown")
        );
        if let Some(kind) = &output.function_error {
            warn!(
                "Function {} reported a {} error",
                self.function_name, kind
            );
        }

        let response = parse_agent_response(&output.payload)?;
        if response.answer.is_empty() {
            debug!("Function {} returned an empty answer", self.function_name);
        }
        Ok(response.answer)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::agent::types::InvocationOutput;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Invoker that records every call and answers with a fixed payload.
    pub(crate) struct RecordingInvoker {
        pub calls: Mutex<Vec<(String, InvocationType, String)>>,
        reply: Reply,
    }

    enum Reply {
        Payload(String),
        TransportFailure,
    }

    impl RecordingInvoker {
        pub(crate) fn replying(payload: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                reply: Reply::Payload(payload.to_string()),
            })
        }

        pub(crate) fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                reply: Reply::TransportFailure,
            })
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub(crate) fn payloads(&self) -> Vec<serde_json::Value> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(_, _, payload)| serde_json::from_str(payload).unwrap())
                .collect()
        }
    }

    #[async_trait]
    impl FunctionInvoker for RecordingInvoker {
        async fn invoke(
            &self,
            function_name: &str,
            invocation_type: InvocationType,
            payload: String,
        ) -> Result<InvocationOutput, AgentError> {
            self.calls
                .lock()
                .unwrap()
                .push((function_name.to_string(), invocation_type, payload));
            match &self.reply {
                Reply::Payload(body) => Ok(InvocationOutput::ok(body.clone())),
                Reply::TransportFailure => Err(AgentError::Transport(Box::new(
                    std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
                ))),
            }
        }
    }

    pub(crate) fn service_with(invoker: Arc<RecordingInvoker>) -> ChatAgentService {
        ChatAgentService::new(invoker, "chat-agent", InvocationType::RequestResponse)
    }

    #[tokio::test]
    async fn sends_exactly_query_and_model() {
        let invoker = RecordingInvoker::replying(r#"{"body": {"answer": "42"}}"#);
        let service = service_with(invoker.clone());

        service.invoke("", "Model 2").await.unwrap();

        let calls = invoker.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "chat-agent");
        assert_eq!(calls[0].1, InvocationType::RequestResponse);
        assert_eq!(
            invoker.payloads()[0],
            serde_json::json!({"query": "", "model": "Model 2"})
        );
    }

    #[tokio::test]
    async fn returns_unwrapped_answer() {
        let invoker = RecordingInvoker::replying(r#"{"body": "{\"answer\": \"42\"}"}"#);
        let service = service_with(invoker);

        assert_eq!(service.invoke("meaning?", "Model 1").await.unwrap(), "42");
    }

    #[tokio::test]
    async fn shape_mismatch_is_an_empty_answer() {
        let service = service_with(RecordingInvoker::replying("{}"));
        assert_eq!(service.invoke("hi", "Model 1").await.unwrap(), "");
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let service = service_with(RecordingInvoker::failing());

        let err = service.invoke("hi", "Model 1").await.unwrap_err();

        assert!(matches!(err, AgentError::Transport(_)));
    }

    #[tokio::test]
    async fn malformed_payload_propagates() {
        let service = service_with(RecordingInvoker::replying("<html>"));

        let err = service.invoke("hi", "Model 1").await.unwrap_err();

        assert!(matches!(err, AgentError::Decode(_)));
    }

    #[tokio::test]
    async fn identical_calls_are_not_collapsed() {
        let invoker = RecordingInvoker::replying(r#"{"body": {"answer": "same"}}"#);
        let service = service_with(invoker.clone());

        service.invoke("again", "Model 3").await.unwrap();
        service.invoke("again", "Model 3").await.unwrap();

        assert_eq!(invoker.call_count(), 2);
    }
}
