use clap::Parser;
use docrelay::adapters::completion_handler::RelayState;
use docrelay::cli::Cli;
use docrelay::config::Settings;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("docrelay=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;
    let addr = format!("{}:{}", settings.server.host, settings.server.port);

    info!(
        mode = ?settings.relay.mode,
        agent_configured = settings.agent.is_complete(),
        "Starting docrelay on {}",
        addr
    );

    let app = docrelay::create_app(RelayState::from_settings(settings));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
