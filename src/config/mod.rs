use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub mod validator;

use crate::agents::config::AgentSettings;
use crate::cli::Cli;

/// Prefix for environment overrides, e.g. `DOCRELAY_AGENT__API_BASE`
pub const ENV_PREFIX: &str = "DOCRELAY";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub relay: RelaySettings,
    #[serde(default)]
    pub upstream: UpstreamSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// What the completion stream carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RelayMode {
    /// The documentation agent's answer, chunked word by word
    #[default]
    Agent,
    /// The completion API's own stream, with the agent answer as context
    Copilot,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelaySettings {
    #[serde(default)]
    pub mode: RelayMode,
    /// Pause after each streamed word
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,
    /// Upper bound on waiting for the documentation agent
    #[serde(default = "default_timeout_secs")]
    pub agent_timeout_secs: u64,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            mode: RelayMode::default(),
            chunk_delay_ms: default_chunk_delay_ms(),
            agent_timeout_secs: default_timeout_secs(),
        }
    }
}

impl RelaySettings {
    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }

    pub fn agent_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_timeout_secs)
    }
}

/// The chat-completions API the conversation is forwarded to in copilot mode
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamSettings {
    #[serde(default = "default_upstream_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Number of trailing conversation messages forwarded
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: default_upstream_url(),
            timeout_secs: default_timeout_secs(),
            history_window: default_history_window(),
        }
    }
}

impl UpstreamSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_chunk_delay_ms() -> u64 {
    50
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_upstream_url() -> String {
    "https://api.githubcopilot.com".to_string()
}

fn default_history_window() -> usize {
    10
}

impl Settings {
    /// Create settings from CLI arguments (config file, then env, then CLI flags)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(&cli.config)?;
        settings.apply_cli_overrides(cli);
        settings.validate()?;
        Ok(settings)
    }

    /// Load `<root>/docrelay.{toml,yaml,json}` if present, then env overrides.
    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let settings = Self::load(&Path::new(root).join("docrelay"))?;
        settings.validate()?;
        Ok(settings)
    }

    fn load(config_path: &Path) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(config_path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .build()?;

        Ok(s.try_deserialize()?)
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(mode) = cli.mode {
            self.relay.mode = mode;
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }
}
