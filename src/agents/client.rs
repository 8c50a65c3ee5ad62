//! Client for the hosted documentation agent

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use super::config::AgentSettings;
use super::error::{AgentError, AgentResult};
use super::prompt::DOCUMENTATION_SYSTEM_PROMPT;
use super::token::{Clock, SystemClock, TokenManager};
use crate::domain::DocumentationAgent;

#[derive(Debug, Deserialize)]
struct AgentChatResponse {
    #[serde(default)]
    choices: Vec<AgentChoice>,
}

#[derive(Debug, Deserialize)]
struct AgentChoice {
    message: AgentMessage,
}

#[derive(Debug, Deserialize)]
struct AgentMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Asks the documentation agent one question per call.
///
/// Tokens are kept for the lifetime of the client, so one instance can be
/// shared across requests.
#[derive(Debug)]
pub struct AgentClient {
    http: reqwest::Client,
    settings: AgentSettings,
    tokens: TokenManager,
}

impl AgentClient {
    pub fn new(settings: AgentSettings) -> Self {
        Self::with_clock(settings, reqwest::Client::new(), Arc::new(SystemClock))
    }

    pub fn with_clock(settings: AgentSettings, http: reqwest::Client, clock: Arc<dyn Clock>) -> Self {
        let tokens = TokenManager::new(
            http.clone(),
            settings.api_base.clone(),
            settings.agent_id.clone(),
            settings.agent_key.clone(),
            clock,
        );

        Self {
            http,
            settings,
            tokens,
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.agent_endpoint.trim_end_matches('/')
        )
    }

    fn system_prompt(&self) -> &str {
        self.settings
            .system_prompt
            .as_deref()
            .unwrap_or(DOCUMENTATION_SYSTEM_PROMPT)
    }
}

#[async_trait]
impl DocumentationAgent for AgentClient {
    async fn get_response(&self, message: &str) -> AgentResult<String> {
        self.settings.validate()?;
        let access_token = self.tokens.ensure_valid().await?;

        let body = json!({
            "model": "",
            "messages": [
                { "role": "system", "content": self.system_prompt() },
                { "role": "user", "content": message },
            ],
        });

        debug!(agent_id = %self.settings.agent_id, "Querying documentation agent");
        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(access_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AgentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: AgentChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AgentError::EmptyResponse)
    }
}
