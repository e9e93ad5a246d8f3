use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, warn};

use super::error::AgentError;
use super::types::{InvocationOutput, InvocationType};

const INVOCATION_TYPE_HEADER: &str = "X-Amz-Invocation-Type";
const FUNCTION_ERROR_HEADER: &str = "X-Amz-Function-Error";
const EXECUTED_VERSION_HEADER: &str = "X-Amz-Executed-Version";

/// Transport used by the agent client to reach a remote function.
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    /// Invoke `function_name` once with a serialized JSON payload and wait for
    /// its result.
    async fn invoke(
        &self,
        function_name: &str,
        invocation_type: InvocationType,
        payload: String,
    ) -> Result<InvocationOutput, AgentError>;
}

/// Lambda-style `Invoke` over HTTP.
///
/// Requests go to `{endpoint}/2015-03-31/functions/{name}/invocations`.
/// The endpoint defaults to the regional service host and can be pointed at
/// a local emulator or a signing proxy instead.
#[derive(Debug, Clone)]
pub struct LambdaHttpInvoker {
    client: Client,
    endpoint: String,
}

impl LambdaHttpInvoker {
    pub fn new(region: &str, endpoint: Option<&str>) -> Self {
        let endpoint = endpoint
            .map(|e| e.to_string())
            .unwrap_or_else(|| regional_endpoint(region));
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: String) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn invocation_url(&self, function_name: &str) -> String {
        format!(
            "{}/2015-03-31/functions/{}/invocations",
            self.endpoint, function_name
        )
    }
}

pub fn regional_endpoint(region: &str) -> String {
    format!("https://lambda.{}.amazonaws.com", region)
}

#[async_trait]
impl FunctionInvoker for LambdaHttpInvoker {
    async fn invoke(
        &self,
        function_name: &str,
        invocation_type: InvocationType,
        payload: String,
    ) -> Result<InvocationOutput, AgentError> {
        let url = self.invocation_url(function_name);
        debug!("Invoking {} ({})", url, invocation_type);

        let response = self
            .client
            .post(&url)
            .header(INVOCATION_TYPE_HEADER, invocation_type.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };
        let function_error = header(FUNCTION_ERROR_HEADER);
        let executed_version = header(EXECUTED_VERSION_HEADER);
        let payload = response.bytes().await?.to_vec();

        if !status.is_success() {
            let message = String::from_utf8_lossy(&payload).into_owned();
            warn!("Function service returned {} for {}", status, function_name);
            return Err(AgentError::Service {
                status: status.as_u16(),
                message,
            });
        }

        Ok(InvocationOutput {
            status_code: status.as_u16(),
            function_error,
            executed_version,
            payload,
        })
    }
}
