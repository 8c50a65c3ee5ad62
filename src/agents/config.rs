//! Configuration for the documentation agent

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{AgentError, AgentResult};

/// Connection details for a GenAI platform agent.
///
/// All four connection fields must be set before any network call; a gap is
/// reported as a configuration error on the first request rather than at
/// startup.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct AgentSettings {
    /// Base URL of the platform API (token endpoints live under it)
    #[serde(default)]
    pub api_base: String,
    /// Agent UUID
    #[serde(default)]
    pub agent_id: String,
    /// Agent access key, exchanged for a refresh token
    #[serde(default, skip_serializing)]
    pub agent_key: String,
    /// Agent chat endpoint (OpenAI-compatible, ends in `/api/v1/`)
    #[serde(default)]
    pub agent_endpoint: String,
    /// Override for the built-in documentation system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl fmt::Debug for AgentSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let agent_key = if self.agent_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };

        f.debug_struct("AgentSettings")
            .field("api_base", &self.api_base)
            .field("agent_id", &self.agent_id)
            .field("agent_key", &agent_key)
            .field("agent_endpoint", &self.agent_endpoint)
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}

impl AgentSettings {
    /// Names of required fields that are empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("agent.api_base", &self.api_base),
            ("agent.agent_id", &self.agent_id),
            ("agent.agent_key", &self.agent_key),
            ("agent.agent_endpoint", &self.agent_endpoint),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn validate(&self) -> AgentResult<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AgentError::Configuration(format!(
                "agent configuration incomplete, missing {}",
                missing.join(", ")
            )))
        }
    }
}
