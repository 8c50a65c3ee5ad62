use clap::Parser;
use std::path::PathBuf;

use crate::config::RelayMode;

/// Chat relay that enriches IDE chat requests with documentation-agent answers
#[derive(Parser, Debug, Clone)]
#[command(name = "docrelay", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "DOCRELAY_CONFIG", default_value = "docrelay.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "DOCRELAY_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "DOCRELAY_PORT")]
    pub port: Option<u16>,

    /// What the completion stream carries
    #[arg(long, value_enum)]
    pub mode: Option<RelayMode>,
}
