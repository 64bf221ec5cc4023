use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use highfive_core::domain::recognition::RecognitionEvent;
use highfive_core::errors::ApplicationError;
use highfive_core::ledger::RecordedCounts;
use highfive_db::LedgerStore;
use highfive_slack::blocks::{self, recognition_modal, MessageTemplate};
use highfive_slack::client::{PostedMessage, SlackApi};
use highfive_slack::commands::{CommandEnvelope, CommandRouteError, HighFiveCommandService};
use highfive_slack::mirror::{MirrorRow, RecognitionMirror};

pub const LEADERBOARD_TITLE: &str = "High-Five Leaderboard";
pub const WEEKLY_TITLE: &str = "Weekly High-Five Leaderboard";

/// Outcome of a recorded submission. `follow_up` posts the card and mirror row.
pub struct Submitted {
    pub counts: RecordedCounts,
    pub follow_up: JoinHandle<()>,
}

/// Glue between Slack and the ledger: record, announce, mirror, report.
#[derive(Clone)]
pub struct RecognitionService {
    store: Arc<dyn LedgerStore>,
    slack: Arc<dyn SlackApi>,
    mirror: Arc<dyn RecognitionMirror>,
    channel_id: String,
    default_top_n: usize,
}

impl RecognitionService {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        slack: Arc<dyn SlackApi>,
        mirror: Arc<dyn RecognitionMirror>,
        channel_id: impl Into<String>,
        default_top_n: usize,
    ) -> Self {
        Self { store, slack, mirror, channel_id: channel_id.into(), default_top_n }
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// Records the recognition and hands the announcement and mirror row to a
    /// background task.
    ///
    /// Only the ledger write can fail the call, so the caller can acknowledge
    /// as soon as the tallies moved. Failures in the follow-up are logged.
    pub async fn submit(
        &self,
        event: &RecognitionEvent,
        correlation_id: &str,
    ) -> Result<Submitted, ApplicationError> {
        let counts = self.store.record_recognition(event).await.map_err(|error| {
            error!(
                event_name = "recognition.record.failed",
                correlation_id,
                giver = %event.giver,
                receiver = %event.receiver,
                error = %error,
                "recognition could not be recorded"
            );
            ApplicationError::from(error)
        })?;

        info!(
            event_name = "recognition.recorded",
            correlation_id,
            giver = %event.giver,
            receiver = %event.receiver,
            core_value = event.core_value.key(),
            giver_given = counts.giver_given,
            receiver_received = counts.receiver_received,
            "recognition recorded"
        );

        let follow_up = tokio::spawn(self.clone().announce(
            event.clone(),
            counts.clone(),
            correlation_id.to_owned(),
        ));
        Ok(Submitted { counts, follow_up })
    }

    async fn announce(self, event: RecognitionEvent, counts: RecordedCounts, correlation_id: String) {
        let card = blocks::recognition_card(&event, &counts);
        if let Err(error) = self.slack.post_message(&self.channel_id, &card).await {
            warn!(
                event_name = "recognition.announce.failed",
                correlation_id = %correlation_id,
                channel_id = %self.channel_id,
                error = %error,
                "recognition card could not be posted"
            );
        }

        if let Err(error) = self.mirror.append(&MirrorRow::new(&event, &counts)).await {
            warn!(
                event_name = "recognition.mirror.failed",
                correlation_id = %correlation_id,
                mirror = self.mirror.name(),
                error = %error,
                "recognition could not be mirrored"
            );
        }
    }

    pub async fn leaderboard_message(
        &self,
        top: Option<usize>,
        title: &str,
    ) -> Result<MessageTemplate, ApplicationError> {
        let summary = self.store.leaderboard(top.unwrap_or(self.default_top_n)).await?;
        Ok(blocks::leaderboard_message(&summary, title))
    }

    /// Posts the weekly summary to the configured channel.
    pub async fn post_weekly_summary(&self, correlation_id: &str) -> Result<PostedMessage, ApplicationError> {
        let message = self.leaderboard_message(None, WEEKLY_TITLE).await?;
        let posted = self.post(&message).await?;
        info!(
            event_name = "report.weekly.posted",
            correlation_id,
            channel_id = %posted.channel,
            ts = %posted.ts,
            "weekly leaderboard posted"
        );
        Ok(posted)
    }

    pub async fn post_test_message(&self) -> Result<PostedMessage, ApplicationError> {
        self.post(&blocks::test_message()).await
    }

    async fn post(&self, message: &MessageTemplate) -> Result<PostedMessage, ApplicationError> {
        self.slack
            .post_message(&self.channel_id, message)
            .await
            .map_err(|error| ApplicationError::Integration(error.to_string()))
    }
}

#[async_trait]
impl HighFiveCommandService for RecognitionService {
    async fn open_recognition_modal(
        &self,
        envelope: &CommandEnvelope,
    ) -> Result<(), CommandRouteError> {
        self.slack
            .open_view(&envelope.trigger_id, &recognition_modal(&envelope.channel_id))
            .await
            .map_err(|error| CommandRouteError::Service(error.to_string()))
    }

    async fn leaderboard(
        &self,
        top: Option<usize>,
        _envelope: &CommandEnvelope,
    ) -> Result<MessageTemplate, CommandRouteError> {
        self.leaderboard_message(top, LEADERBOARD_TITLE)
            .await
            .map_err(|error| CommandRouteError::Service(error.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use highfive_db::{InMemoryLedgerStore, LedgerStore};
    use highfive_slack::blocks::{MessageTemplate, ModalView};
    use highfive_slack::client::{PostedMessage, SlackApi, SlackApiError};
    use highfive_slack::mirror::{MirrorError, MirrorRow, RecognitionMirror};

    use super::RecognitionService;

    /// Records calls instead of talking to Slack.
    #[derive(Default)]
    pub struct RecordingSlack {
        pub posts: Mutex<Vec<(String, MessageTemplate)>>,
        pub views: Mutex<Vec<(String, ModalView)>>,
        pub fail: bool,
        pub post_delay: Duration,
    }

    #[async_trait]
    impl SlackApi for RecordingSlack {
        async fn post_message(
            &self,
            channel: &str,
            message: &MessageTemplate,
        ) -> Result<PostedMessage, SlackApiError> {
            if !self.post_delay.is_zero() {
                tokio::time::sleep(self.post_delay).await;
            }
            if self.fail {
                return Err(SlackApiError::Rejected {
                    method: "chat.postMessage",
                    error: "not_in_channel".to_owned(),
                });
            }
            self.posts.lock().expect("lock").push((channel.to_owned(), message.clone()));
            Ok(PostedMessage { channel: channel.to_owned(), ts: "1.0".to_owned() })
        }

        async fn open_view(&self, trigger_id: &str, view: &ModalView) -> Result<(), SlackApiError> {
            if self.fail {
                return Err(SlackApiError::Rejected {
                    method: "views.open",
                    error: "expired_trigger_id".to_owned(),
                });
            }
            self.views.lock().expect("lock").push((trigger_id.to_owned(), view.clone()));
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct RecordingMirror {
        pub rows: Mutex<Vec<MirrorRow>>,
        pub fail: bool,
    }

    #[async_trait]
    impl RecognitionMirror for RecordingMirror {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn append(&self, row: &MirrorRow) -> Result<(), MirrorError> {
            if self.fail {
                return Err(MirrorError::Status(502));
            }
            self.rows.lock().expect("lock").push(row.clone());
            Ok(())
        }
    }

    pub struct Harness {
        pub service: RecognitionService,
        pub store: Arc<dyn LedgerStore>,
        pub slack: Arc<RecordingSlack>,
        pub mirror: Arc<RecordingMirror>,
    }

    pub fn harness_with(
        store: Arc<dyn LedgerStore>,
        slack: RecordingSlack,
        mirror: RecordingMirror,
    ) -> Harness {
        let slack = Arc::new(slack);
        let mirror = Arc::new(mirror);
        let service = RecognitionService::new(
            Arc::clone(&store),
            Arc::clone(&slack) as Arc<dyn SlackApi>,
            Arc::clone(&mirror) as Arc<dyn RecognitionMirror>,
            "C_HIGHFIVE",
            5,
        );
        Harness { service, store, slack, mirror }
    }

    pub fn harness() -> Harness {
        harness_with(
            Arc::new(InMemoryLedgerStore::default()),
            RecordingSlack::default(),
            RecordingMirror::default(),
        )
    }
}
