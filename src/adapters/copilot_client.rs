//! Forwarding client for the Copilot chat-completions API

use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::agents::prompt::COMPLETION_SYSTEM_PROMPT;
use crate::config::UpstreamSettings;
use crate::domain::ChatMessage;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("completion API unreachable: {0}")]
    Transport(String),

    #[error("completion API did not respond within {0}s")]
    Timeout(u64),

    #[error("completion API returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Transport(err.to_string())
    }
}

/// Append the relay's system message to the conversation.
///
/// The documentation answer and the attached code are added as separate
/// sections when present.
pub fn compose_messages(
    history: &[ChatMessage],
    code_context: Option<&str>,
    documentation: Option<&str>,
) -> Vec<ChatMessage> {
    let mut system = COMPLETION_SYSTEM_PROMPT.to_string();

    if let Some(answer) = documentation {
        system.push_str("\n\n---\n\nDigitalOcean Documentation Insight:\n");
        system.push_str(answer);
    }

    if let Some(code) = code_context {
        system.push_str("\n\n---\n\nHere is the full content of the latest file:\n");
        system.push_str(code);
    }

    let mut messages = history.to_vec();
    messages.push(ChatMessage::system(system));
    messages
}

pub struct CopilotClient {
    http: reqwest::Client,
    settings: UpstreamSettings,
}

impl CopilotClient {
    pub fn new(settings: UpstreamSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    pub fn history_window(&self) -> usize {
        self.settings.history_window
    }

    /// Start a streamed completion on behalf of the caller.
    ///
    /// The timeout covers the wait for response headers only; the body is
    /// streamed for as long as the API keeps sending.
    pub async fn open_stream(
        &self,
        session_token: &str,
        messages: &[ChatMessage],
    ) -> Result<reqwest::Response, UpstreamError> {
        let url = format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );
        debug!(%url, messages = messages.len(), "Forwarding conversation");

        let request = self
            .http
            .post(url)
            .bearer_auth(session_token)
            .json(&json!({
                "messages": messages,
                "stream": true,
            }))
            .send();

        let response = tokio::time::timeout(self.settings.timeout(), request)
            .await
            .map_err(|_| UpstreamError::Timeout(self.settings.timeout_secs))??;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

/// Watches forwarded bytes for the `data: [DONE]` sentinel, including one
/// split across chunk boundaries.
#[derive(Debug, Default)]
pub struct DoneDetector {
    tail: Vec<u8>,
    seen: bool,
}

impl DoneDetector {
    const MARKER: &'static [u8] = b"data: [DONE]";

    pub fn observe(&mut self, chunk: &[u8]) -> bool {
        if self.seen {
            return true;
        }

        let mut window = std::mem::take(&mut self.tail);
        window.extend_from_slice(chunk);
        self.seen = window
            .windows(Self::MARKER.len())
            .any(|w| w == Self::MARKER);

        let keep = Self::MARKER.len() - 1;
        let start = window.len().saturating_sub(keep);
        self.tail = window.split_off(start);
        self.seen
    }

    pub fn seen(&self) -> bool {
        self.seen
    }
}
