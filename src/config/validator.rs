use thiserror::Error;

use crate::config::{RelayMode, RelaySettings, ServerSettings, Settings, UpstreamSettings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    /// Check settings that must be right before the server starts.
    ///
    /// Incomplete agent credentials are only warned about: each request then
    /// streams an explanatory answer instead of failing.
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        errors.extend(Self::validate_server(&settings.server));
        errors.extend(Self::validate_relay(&settings.relay));
        if settings.relay.mode == RelayMode::Copilot {
            errors.extend(Self::validate_upstream(&settings.upstream));
        }

        let missing = settings.agent.missing_fields();
        if !missing.is_empty() {
            tracing::warn!(
                "Documentation agent not fully configured (missing {}); answers will be degraded",
                missing.join(", ")
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        errors
    }

    fn validate_relay(relay: &RelaySettings) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if relay.agent_timeout_secs == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "relay.agent_timeout_secs".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        errors
    }

    fn validate_upstream(upstream: &UpstreamSettings) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if let Err(e) = reqwest::Url::parse(&upstream.base_url) {
            errors.push(ValidationError::InvalidValue {
                field: "upstream.base_url".to_string(),
                reason: e.to_string(),
            });
        }

        if upstream.timeout_secs == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "upstream.timeout_secs".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if upstream.history_window == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "upstream.history_window".to_string(),
                reason: "At least one message must be forwarded".to_string(),
            });
        }

        errors
    }
}
