use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};
use uuid::Uuid;

use crate::service::RecognitionService;

/// Posts the leaderboard every `period`, starting one period after launch.
pub fn spawn(service: RecognitionService, period: Duration) -> JoinHandle<()> {
    info!(
        event_name = "system.report.scheduled",
        correlation_id = "bootstrap",
        interval_secs = period.as_secs(),
        "weekly leaderboard reporter scheduled"
    );

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            run_once(&service).await;
        }
    })
}

/// One reporting pass. Failures are logged; the schedule keeps running.
pub async fn run_once(service: &RecognitionService) -> bool {
    let correlation_id = Uuid::new_v4().to_string();
    match service.post_weekly_summary(&correlation_id).await {
        Ok(_) => true,
        Err(error) => {
            error!(
                event_name = "report.weekly.failed",
                correlation_id = %correlation_id,
                error = %error,
                "weekly leaderboard could not be posted"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use highfive_db::InMemoryLedgerStore;

    use super::{run_once, spawn};
    use crate::service::testing::{harness, harness_with, RecordingMirror, RecordingSlack};

    #[tokio::test]
    async fn run_once_posts_empty_state_for_empty_ledger() {
        let harness = harness();
        assert!(run_once(&harness.service).await);

        let posts = harness.slack.posts.lock().expect("lock");
        assert_eq!(posts.len(), 1);
        assert!(posts[0].1.fallback_text.contains("no high-fives yet"));
    }

    #[tokio::test]
    async fn run_once_reports_failure_without_panicking() {
        let harness = harness_with(
            Arc::new(InMemoryLedgerStore::default()),
            RecordingSlack { fail: true, ..Default::default() },
            RecordingMirror::default(),
        );
        assert!(!run_once(&harness.service).await);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_reporter_waits_one_period_before_posting() {
        let harness = harness();
        let handle = spawn(harness.service.clone(), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(harness.slack.posts.lock().expect("lock").is_empty());

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(harness.slack.posts.lock().expect("lock").len(), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(harness.slack.posts.lock().expect("lock").len(), 2);

        handle.abort();
    }
}
