use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::blocks::{Block, MessageTemplate, ModalView};

#[derive(Debug, Error)]
pub enum SlackApiError {
    #[error("slack request to `{method}` failed: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("slack `{method}` returned HTTP {status}")]
    Status { method: &'static str, status: u16 },
    #[error("slack `{method}` rejected the call: {error}")]
    Rejected { method: &'static str, error: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostedMessage {
    pub channel: String,
    pub ts: String,
}

/// The Slack Web API surface the bot needs.
#[async_trait]
pub trait SlackApi: Send + Sync {
    async fn post_message(
        &self,
        channel: &str,
        message: &MessageTemplate,
    ) -> Result<PostedMessage, SlackApiError>;

    async fn open_view(&self, trigger_id: &str, view: &ModalView) -> Result<(), SlackApiError>;
}

#[derive(Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "has_no_blocks")]
    blocks: &'a [Block],
}

fn has_no_blocks(blocks: &&[Block]) -> bool {
    blocks.is_empty()
}

#[derive(Serialize)]
struct OpenViewRequest<'a> {
    trigger_id: &'a str,
    view: &'a ModalView,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

/// Bot-token client for `https://slack.com/api`.
pub struct WebApiClient {
    http: reqwest::Client,
    base_url: String,
    bot_token: SecretString,
}

impl WebApiClient {
    pub fn new(base_url: impl Into<String>, bot_token: SecretString) -> Result<Self, SlackApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|source| SlackApiError::Transport { method: "client", source })?;
        Ok(Self { http, base_url: base_url.into().trim_end_matches('/').to_owned(), bot_token })
    }

    async fn call<T: Serialize + ?Sized>(
        &self,
        method: &'static str,
        body: &T,
    ) -> Result<ApiResponse, SlackApiError> {
        let response = self
            .http
            .post(format!("{}/{method}", self.base_url))
            .bearer_auth(self.bot_token.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|source| SlackApiError::Transport { method, source })?;

        if !response.status().is_success() {
            return Err(SlackApiError::Status { method, status: response.status().as_u16() });
        }

        let payload: ApiResponse =
            response.json().await.map_err(|source| SlackApiError::Transport { method, source })?;
        if !payload.ok {
            let error = payload.error.unwrap_or_else(|| "unknown_error".to_owned());
            warn!(event_name = "slack.api.rejected", method, error = %error, "slack api call rejected");
            return Err(SlackApiError::Rejected { method, error });
        }
        Ok(payload)
    }
}

#[async_trait]
impl SlackApi for WebApiClient {
    async fn post_message(
        &self,
        channel: &str,
        message: &MessageTemplate,
    ) -> Result<PostedMessage, SlackApiError> {
        let request =
            PostMessageRequest { channel, text: &message.fallback_text, blocks: &message.blocks };
        let response = self.call("chat.postMessage", &request).await?;
        Ok(PostedMessage {
            channel: response.channel.unwrap_or_else(|| channel.to_owned()),
            ts: response.ts.unwrap_or_default(),
        })
    }

    async fn open_view(&self, trigger_id: &str, view: &ModalView) -> Result<(), SlackApiError> {
        self.call("views.open", &OpenViewRequest { trigger_id, view }).await?;
        Ok(())
    }
}
