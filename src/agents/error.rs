//! Error types for the documentation agent client

use thiserror::Error;

/// Errors that can occur while obtaining a documentation answer
#[derive(Debug, Error)]
pub enum AgentError {
    /// Required agent setting is missing
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Token issuance or refresh was rejected
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// A token returned by the platform could not be decoded
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Network failure reaching the platform or the agent
    #[error("Transport error: {0}")]
    Transport(String),

    /// Agent endpoint answered with a non-success status
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Agent answered without any completion text
    #[error("Agent returned an empty response")]
    EmptyResponse,

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Agent call exceeded the configured deadline
    #[error("Operation timed out after {0}s")]
    Timeout(u64),
}

/// Failures of the two-stage credential exchange
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("refresh token issuance failed (status {status})")]
    RefreshIssuance { status: u16 },

    #[error("access token refresh failed (status {status})")]
    AccessRefresh { status: u16 },
}

/// Errors decoding a JWT issued by the platform.
///
/// Expiry is not an error: `is_expired` reports it as `Ok(true)`.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is missing the exp claim")]
    MissingExpiry,

    #[error("malformed token: {0}")]
    Malformed(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::MissingRequiredClaim(claim) if claim == "exp" => TokenError::MissingExpiry,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AgentError::Transport(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            AgentError::Transport(format!("Connection error: {}", err))
        } else if err.is_decode() {
            AgentError::Parse(err.to_string())
        } else {
            AgentError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::Parse(err.to_string())
    }
}

impl AgentError {
    /// Whether the failure comes from missing settings rather than the network
    pub fn is_configuration(&self) -> bool {
        matches!(self, AgentError::Configuration(_))
    }
}

/// Result type alias for agent operations
pub type AgentResult<T> = Result<T, AgentError>;
