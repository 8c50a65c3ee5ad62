//! Documentation agent integration
//!
//! - `token` - refresh/access token lifecycle against the GenAI platform
//! - `client` - one-shot chat completion against the agent endpoint
//! - `context` - code context extracted from attached files
//! - `prompt` - system prompts and the agent input template

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod prompt;
pub mod token;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::AgentClient;
pub use config::AgentSettings;
pub use error::{AgentError, AgentResult, AuthError, TokenError};
pub use prompt::AgentPrompt;
pub use token::TokenManager;
