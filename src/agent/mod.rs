pub mod client;
pub mod error;
pub mod invoker;
pub mod types;

pub use client::ChatAgentService;
pub use error::AgentError;
pub use types::InvocationType;
