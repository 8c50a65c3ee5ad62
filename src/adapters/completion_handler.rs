//! `POST /completion`: validate, consult the documentation agent, stream.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::StreamExt;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::adapters::copilot_client::{compose_messages, CopilotClient, DoneDetector};
use crate::adapters::event_stream::{CompletionStream, CompletionStreamSender, Disconnected};
use crate::agents::context::{attached_code, extract_code_context};
use crate::agents::error::{AgentError, AgentResult};
use crate::agents::prompt::AgentPrompt;
use crate::agents::AgentClient;
use crate::config::{RelayMode, Settings};
use crate::domain::chat::recent_messages;
use crate::domain::{ChatMessage, CompletionEvent, CompletionRequest, DocumentationAgent};

/// Header carrying the caller's session token
pub const SESSION_TOKEN_HEADER: &str = "x-github-token";

const STREAM_BUFFER: usize = 32;

const AGENT_NOT_CONFIGURED: &str = "The documentation agent configuration is incomplete, so no documentation answer is available for this request.";
const AGENT_UNAVAILABLE: &str = "The documentation agent is currently unavailable, so no documentation answer could be retrieved. Please try again later.";
const UPSTREAM_UNAVAILABLE: &str = "The completion service could not be reached, so no answer is available for this request. Please try again later.";

/// Shared state for the relay routes
#[derive(Clone)]
pub struct RelayState {
    pub settings: Arc<Settings>,
    pub agent: Arc<dyn DocumentationAgent>,
    pub copilot: Arc<CopilotClient>,
}

impl RelayState {
    pub fn new(settings: Settings, agent: Arc<dyn DocumentationAgent>) -> Self {
        let copilot = Arc::new(CopilotClient::new(settings.upstream.clone()));
        Self {
            settings: Arc::new(settings),
            agent,
            copilot,
        }
    }

    /// State backed by a real agent client built from the settings
    pub fn from_settings(settings: Settings) -> Self {
        let agent = Arc::new(AgentClient::new(settings.agent.clone()));
        Self::new(settings, agent)
    }
}

/// Requests rejected before any stream is opened
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("No messages provided")]
    NoMessages,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match self {
            RelayError::MissingToken => StatusCode::UNAUTHORIZED,
            RelayError::InvalidBody(_) | RelayError::NoMessages => StatusCode::BAD_REQUEST,
        };

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

fn session_token(headers: &HeaderMap) -> Result<String, RelayError> {
    headers
        .get(SESSION_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(RelayError::MissingToken)
}

pub async fn completion(
    State(state): State<RelayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, RelayError> {
    let session_token = session_token(&headers)?;

    let request: CompletionRequest =
        serde_json::from_slice(&body).map_err(|e| RelayError::InvalidBody(e.to_string()))?;
    if request.messages.is_empty() {
        return Err(RelayError::NoMessages);
    }

    let request_id = Uuid::new_v4();
    let mode = state.settings.relay.mode;
    info!(%request_id, messages = request.messages.len(), ?mode, "Relaying completion");

    let (sender, stream) = CompletionStream::channel(STREAM_BUFFER);
    let span = tracing::info_span!("completion", %request_id);

    tokio::spawn(
        async move {
            let result = match mode {
                RelayMode::Agent => stream_agent_answer(&state, &request.messages, &sender).await,
                RelayMode::Copilot => {
                    stream_copilot_completion(&state, &request.messages, &session_token, &sender)
                        .await
                }
            };
            match result {
                Ok(()) => debug!("Stream completed"),
                Err(Disconnected) => debug!("Client disconnected, stream abandoned"),
            }
        }
        .instrument(span),
    );

    Ok(stream.into_response())
}

/// Ask the agent about the latest message, bounded by the relay timeout.
async fn fetch_documentation(state: &RelayState, latest: &ChatMessage) -> AgentResult<String> {
    let code_context = extract_code_context(latest);
    let prompt = AgentPrompt::new(latest.query(), &code_context).render();

    let relay = &state.settings.relay;
    match tokio::time::timeout(relay.agent_timeout(), state.agent.get_response(&prompt)).await {
        Ok(result) => result,
        Err(_) => Err(AgentError::Timeout(relay.agent_timeout_secs)),
    }
}

/// Like [`fetch_documentation`], but gives up as soon as the client leaves.
async fn fetch_documentation_while_connected(
    state: &RelayState,
    latest: &ChatMessage,
    sender: &CompletionStreamSender,
) -> Result<AgentResult<String>, Disconnected> {
    tokio::select! {
        _ = sender.closed() => Err(Disconnected),
        answer = fetch_documentation(state, latest) => Ok(answer),
    }
}

fn degraded_answer(err: &AgentError) -> &'static str {
    if err.is_configuration() {
        AGENT_NOT_CONFIGURED
    } else {
        AGENT_UNAVAILABLE
    }
}

/// Placeholder delta, the agent's answer word by word, then the terminator.
async fn stream_agent_answer(
    state: &RelayState,
    messages: &[ChatMessage],
    sender: &CompletionStreamSender,
) -> Result<(), Disconnected> {
    sender.send(CompletionEvent::keep_alive()).await?;

    let Some(latest) = messages.last() else {
        return sender.finish().await;
    };

    let answer = match fetch_documentation_while_connected(state, latest, sender).await? {
        Ok(answer) => answer,
        Err(e) => {
            warn!(error = %e, "Documentation agent failed, streaming explanation instead");
            degraded_answer(&e).to_string()
        }
    };

    sender
        .send_words(&answer, state.settings.relay.chunk_delay())
        .await?;
    sender.finish().await
}

/// Forward the enriched conversation to the completion API and pass its
/// stream through, closing it ourselves if the API does not.
async fn stream_copilot_completion(
    state: &RelayState,
    messages: &[ChatMessage],
    session_token: &str,
    sender: &CompletionStreamSender,
) -> Result<(), Disconnected> {
    sender.send(CompletionEvent::keep_alive()).await?;

    let Some(latest) = messages.last() else {
        return sender.finish().await;
    };

    let documentation = match fetch_documentation_while_connected(state, latest, sender).await? {
        Ok(answer) => Some(answer),
        Err(e) => {
            warn!(error = %e, "Documentation agent failed, forwarding without insight");
            None
        }
    };

    let history = recent_messages(messages, state.copilot.history_window());
    let code_context = attached_code(latest);
    let forwarded = compose_messages(history, code_context.as_deref(), documentation.as_deref());

    let upstream = tokio::select! {
        _ = sender.closed() => return Err(Disconnected),
        response = state.copilot.open_stream(session_token, &forwarded) => response,
    };

    let response = match upstream {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Completion API request failed");
            sender
                .send_words(UPSTREAM_UNAVAILABLE, state.settings.relay.chunk_delay())
                .await?;
            return sender.finish().await;
        }
    };

    let mut body = response.bytes_stream();
    let mut detector = DoneDetector::default();
    loop {
        let chunk = tokio::select! {
            _ = sender.closed() => return Err(Disconnected),
            chunk = body.next() => chunk,
        };

        match chunk {
            Some(Ok(bytes)) => {
                detector.observe(&bytes);
                sender.send_raw(bytes).await?;
            }
            Some(Err(e)) => {
                warn!(error = %e, "Completion API stream broke off");
                break;
            }
            None => break,
        }
    }

    if detector.seen() {
        Ok(())
    } else {
        sender.terminate().await
    }
}
