use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use highfive_core::domain::recognition::RecognitionEvent;
use highfive_core::ledger::RecordedCounts;

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("mirror webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mirror webhook returned HTTP {0}")]
    Status(u16),
}

/// One spreadsheet row per recognition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MirrorRow {
    pub timestamp: String,
    pub giver: String,
    pub receiver: String,
    pub core_value: &'static str,
    pub core_value_label: &'static str,
    pub message: String,
    pub giver_total: u64,
    pub receiver_total: u64,
}

impl MirrorRow {
    pub fn new(event: &RecognitionEvent, counts: &RecordedCounts) -> Self {
        Self {
            timestamp: event.submitted_at.to_rfc3339(),
            giver: event.giver.to_string(),
            receiver: event.receiver.to_string(),
            core_value: event.core_value.key(),
            core_value_label: event.core_value.label(),
            message: event.message.clone(),
            giver_total: counts.giver_given,
            receiver_total: counts.receiver_received,
        }
    }
}

#[async_trait]
pub trait RecognitionMirror: Send + Sync {
    fn name(&self) -> &'static str;

    async fn append(&self, row: &MirrorRow) -> Result<(), MirrorError>;
}

/// Posts rows to a spreadsheet webhook such as an Apps Script web app.
pub struct WebhookMirror {
    http: reqwest::Client,
    url: String,
}

impl WebhookMirror {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, MirrorError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url: url.into() })
    }
}

#[async_trait]
impl RecognitionMirror for WebhookMirror {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn append(&self, row: &MirrorRow) -> Result<(), MirrorError> {
        let response = self.http.post(&self.url).json(row).send().await?;
        if !response.status().is_success() {
            return Err(MirrorError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Used when mirroring is disabled.
#[derive(Default)]
pub struct DisabledMirror;

#[async_trait]
impl RecognitionMirror for DisabledMirror {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn append(&self, _row: &MirrorRow) -> Result<(), MirrorError> {
        Ok(())
    }
}
