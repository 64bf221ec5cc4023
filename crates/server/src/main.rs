mod bootstrap;
mod health;
mod reporter;
mod routes;
mod service;

use std::time::Duration;

use anyhow::{Context, Result};
use highfive_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use highfive_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let reporter = app.config.report.enabled.then(|| {
        reporter::spawn(app.service.clone(), Duration::from_secs(app.config.report.interval_secs))
    });

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        ledger_backend = app.store.backend(),
        channel_id = %app.config.slack.channel_id,
        signature_verification = app.config.slack.signing_secret.is_some(),
        "highfive-server listening"
    );

    axum::serve(listener, routes::router(app.app_state()))
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "highfive-server stopping"
    );
    if let Some(reporter) = reporter {
        reporter.abort();
    }

    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(
            event_name = "system.server.signal_error",
            correlation_id = "shutdown",
            error = %error,
            "failed to listen for shutdown signal"
        );
    }
}
