pub mod chat;
pub mod event;

pub use chat::{ChatMessage, CompletionRequest, CopilotReference};
pub use event::CompletionEvent;

use async_trait::async_trait;

use crate::agents::error::AgentResult;

/// Port for the documentation agent, so the relay can run against a stub
#[async_trait]
pub trait DocumentationAgent: Send + Sync {
    /// Ask the agent one question and wait for the whole answer
    async fn get_response(&self, message: &str) -> AgentResult<String>;
}
