//! # docrelay - documentation-enriched chat relay
//!
//! docrelay sits between an IDE chat extension and two upstream services: a
//! chat-completions API and a hosted documentation agent. Each chat request
//! is enriched with the code attached to its latest message and with the
//! agent's answer, and the result is streamed back as server-sent events.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clap::Parser;
//! use docrelay::adapters::completion_handler::RelayState;
//! use docrelay::cli::Cli;
//! use docrelay::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new_with_cli(&Cli::parse())?;
//!     let addr = format!("{}:{}", settings.server.host, settings.server.port);
//!     let app = docrelay::create_app(RelayState::from_settings(settings));
//!
//!     let listener = tokio::net::TcpListener::bind(addr).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: chat payloads, stream events, the documentation agent port
//! - **Agents**: token lifecycle, agent client, context extraction, prompts
//! - **Adapters**: HTTP handlers, SSE body, completion API client
//! - **Config**: settings from file, environment, and CLI

pub mod adapters;
pub mod agents;
pub mod cli;
pub mod config;
pub mod domain;

use crate::adapters::completion_handler::{self, RelayState};
use crate::adapters::health_handler::HealthHandler;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Creates the Axum application router with all endpoints configured.
pub fn create_app(state: RelayState) -> Router {
    let health_handler = Arc::new(HealthHandler::new(state.settings.clone()));

    Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }))
        .route("/completion", post(completion_handler::completion))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}
