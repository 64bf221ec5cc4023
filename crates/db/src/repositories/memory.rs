use tokio::sync::Mutex;

use highfive_core::domain::recognition::UserId;
use highfive_core::errors::LedgerError;
use highfive_core::ledger::{LedgerSnapshot, RecordedCounts};

use super::{validate_pair, LedgerStore};

#[derive(Default)]
pub struct InMemoryLedgerStore {
    ledger: Mutex<LedgerSnapshot>,
}

impl InMemoryLedgerStore {
    pub fn with_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self { ledger: Mutex::new(snapshot) }
    }
}

#[async_trait::async_trait]
impl LedgerStore for InMemoryLedgerStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn record_event(
        &self,
        giver: &UserId,
        receiver: &UserId,
    ) -> Result<RecordedCounts, LedgerError> {
        validate_pair(giver, receiver)?;
        let mut ledger = self.ledger.lock().await;
        Ok(ledger.record(giver, receiver))
    }

    async fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        Ok(self.ledger.lock().await.clone())
    }

    async fn reset(&self) -> Result<(), LedgerError> {
        *self.ledger.lock().await = LedgerSnapshot::default();
        Ok(())
    }
}
