use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use jobwatch_client::{SlackClient, SlackConfig, SourceRegistry};
use jobwatch_core::chat::ChatCommands;
use jobwatch_core::platform::parse_platform_list;
use jobwatch_core::poller::{PollingDriver, TracingPollReporter};
use jobwatch_core::schedule::PollerConfig;
use jobwatch_db::{Database, DatabaseConfig};
use jobwatch_server::routes;
use jobwatch_server::state::AppState;

/// Slack payloads are small; anything larger is not ours.
const MAX_BODY_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jobwatch=info".parse()?))
        .with_target(false)
        .init();

    let platforms = parse_platform_list(
        &std::env::var("JOBWATCH_PLATFORMS").unwrap_or_else(|_| "guru,freelancer".to_string()),
    )?;
    let poller_config = PollerConfig::from_env()?;
    let port = std::env::var("JOBWATCH_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");

    let db = Database::connect(&DatabaseConfig::from_env()?).await?;
    db.migrate().await?;

    let slack = SlackClient::new(SlackConfig::from_env()?)?;
    let verification_token = slack.verification_token().to_string();
    let registry = SourceRegistry::from_env(&platforms).await?;

    let cancel = CancellationToken::new();
    let mut pollers = JoinSet::new();
    for platform in registry.platforms() {
        let driver = PollingDriver::new(
            registry.get(platform)?.clone(),
            db.watermark_repo(),
            db.filter_repo(),
            slack.clone(),
            poller_config.clone(),
        );
        let cancel = cancel.clone();
        pollers.spawn(async move { (platform, driver.run(cancel, &TracingPollReporter).await) });
    }

    let state = Arc::new(AppState {
        commands: ChatCommands::new(db.filter_repo(), slack),
        db,
        verification_token,
    });

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    tracing::info!(platforms = ?registry.platforms(), "Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    cancel.cancel();
    while let Some(joined) = pollers.join_next().await {
        match joined {
            Ok((platform, Ok(()))) => tracing::info!(%platform, "Poller stopped"),
            Ok((platform, Err(e))) => tracing::error!(%platform, error = %e, "Poller failed"),
            Err(e) => tracing::error!(error = %e, "Poller task panicked"),
        }
    }

    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for CTRL+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
    cancel.cancel();
}
