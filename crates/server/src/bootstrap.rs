use std::sync::Arc;
use std::time::Duration;

use highfive_core::config::{AppConfig, ConfigError, LoadOptions};
use highfive_db::{open_ledger_store, LedgerStore, RepositoryError};
use highfive_slack::client::{SlackApi, SlackApiError, WebApiClient};
use highfive_slack::mirror::{DisabledMirror, MirrorError, RecognitionMirror, WebhookMirror};
use thiserror::Error;
use tracing::info;

use crate::routes::AppState;
use crate::service::RecognitionService;

pub struct Application {
    pub config: AppConfig,
    pub store: Arc<dyn LedgerStore>,
    pub service: RecognitionService,
}

impl Application {
    pub fn app_state(&self) -> AppState {
        AppState::new(self.service.clone(), self.config.slack.signing_secret.clone())
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("ledger store could not be opened: {0}")]
    Ledger(#[source] RepositoryError),
    #[error("slack client could not be built: {0}")]
    Slack(#[source] SlackApiError),
    #[error("spreadsheet mirror could not be built: {0}")]
    Mirror(#[source] MirrorError),
    #[error("mirror is enabled but no webhook url is configured")]
    MissingMirrorUrl,
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let store = open_ledger_store(&config.ledger).await.map_err(BootstrapError::Ledger)?;

    let slack: Arc<dyn SlackApi> = Arc::new(
        WebApiClient::new(config.slack.api_base_url.clone(), config.slack.bot_token.clone())
            .map_err(BootstrapError::Slack)?,
    );

    let mirror: Arc<dyn RecognitionMirror> = if config.mirror.enabled {
        let url = config.mirror.webhook_url.clone().ok_or(BootstrapError::MissingMirrorUrl)?;
        Arc::new(
            WebhookMirror::new(url, Duration::from_secs(config.mirror.timeout_secs))
                .map_err(BootstrapError::Mirror)?,
        )
    } else {
        Arc::new(DisabledMirror)
    };
    info!(
        event_name = "system.bootstrap.mirror_configured",
        correlation_id = "bootstrap",
        mirror = mirror.name(),
        "recognition mirror configured"
    );

    let service = RecognitionService::new(
        Arc::clone(&store),
        slack,
        mirror,
        config.slack.channel_id.clone(),
        config.report.top_n,
    );

    Ok(Application { config, store, service })
}
