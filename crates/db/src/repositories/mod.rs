use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use highfive_core::config::{LedgerBackend, LedgerConfig};
use highfive_core::domain::recognition::{RecognitionEvent, UserId};
use highfive_core::errors::LedgerError;
use highfive_core::leaderboard::{render_summary, LeaderboardSummary};
use highfive_core::ledger::{LedgerSnapshot, RecordedCounts};

use crate::{connect_with_settings, migrations};

pub mod file;
pub mod memory;
pub mod tally;

pub use file::JsonFileLedgerStore;
pub use memory::InMemoryLedgerStore;
pub use tally::SqlLedgerStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("ledger file `{path}` is not accessible: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("ledger file `{path}` is corrupt: {source}")]
    Corrupt { path: PathBuf, source: serde_json::Error },
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for LedgerError {
    fn from(value: RepositoryError) -> Self {
        LedgerError::Persistence(value.to_string())
    }
}

/// Exclusive owner of the give/receive tallies.
///
/// Implementations serialize every mutation through a single internal lock,
/// so concurrent `record_event` calls never lose an increment. A failed call
/// leaves no partial increment behind.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn record_event(
        &self,
        giver: &UserId,
        receiver: &UserId,
    ) -> Result<RecordedCounts, LedgerError>;

    async fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError>;

    /// Clears both tallies. Only reachable from operator tooling.
    async fn reset(&self) -> Result<(), LedgerError>;

    async fn record_recognition(
        &self,
        event: &RecognitionEvent,
    ) -> Result<RecordedCounts, LedgerError> {
        self.record_event(&event.giver, &event.receiver).await
    }

    async fn leaderboard(&self, top_n: usize) -> Result<LeaderboardSummary, LedgerError> {
        let snapshot = self.snapshot().await?;
        Ok(render_summary(&snapshot, top_n))
    }
}

pub(crate) fn validate_pair(giver: &UserId, receiver: &UserId) -> Result<(), LedgerError> {
    if giver.as_str().trim().is_empty() {
        return Err(LedgerError::Validation("giver must be a non-empty user id".to_owned()));
    }
    if receiver.as_str().trim().is_empty() {
        return Err(LedgerError::Validation("receiver must be a non-empty user id".to_owned()));
    }
    Ok(())
}

/// Builds the configured store, connecting and migrating SQLite when selected.
pub async fn open_ledger_store(
    config: &LedgerConfig,
) -> Result<Arc<dyn LedgerStore>, RepositoryError> {
    let store: Arc<dyn LedgerStore> = match config.backend {
        LedgerBackend::Sqlite => {
            let pool = connect_with_settings(
                &config.database_url,
                config.max_connections,
                config.timeout_secs,
            )
            .await?;
            migrations::run_pending(&pool).await?;
            Arc::new(SqlLedgerStore::new(pool))
        }
        LedgerBackend::File => Arc::new(JsonFileLedgerStore::new(config.file_path.clone())),
        LedgerBackend::Memory => Arc::new(InMemoryLedgerStore::default()),
    };

    info!(
        event_name = "system.ledger.opened",
        correlation_id = "bootstrap",
        backend = store.backend(),
        "recognition ledger store opened"
    );
    Ok(store)
}
