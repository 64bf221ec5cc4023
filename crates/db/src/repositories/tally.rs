use sqlx::Row;
use tokio::sync::Mutex;

use highfive_core::domain::recognition::UserId;
use highfive_core::errors::LedgerError;
use highfive_core::ledger::{LedgerSnapshot, RecordedCounts};

use super::{validate_pair, LedgerStore, RepositoryError};
use crate::DbPool;

const KIND_GIVEN: &str = "given";
const KIND_RECEIVED: &str = "received";

/// Keyed SQLite tally. Both upserts of a recognition share one transaction.
pub struct SqlLedgerStore {
    pool: DbPool,
    write_lock: Mutex<()>,
}

impl SqlLedgerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool, write_lock: Mutex::new(()) }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn record_in_transaction(
        &self,
        giver: &UserId,
        receiver: &UserId,
    ) -> Result<RecordedCounts, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let giver_given = increment(&mut tx, KIND_GIVEN, giver).await?;
        let receiver_received = increment(&mut tx, KIND_RECEIVED, receiver).await?;
        tx.commit().await?;

        Ok(RecordedCounts {
            giver: giver.clone(),
            giver_given,
            receiver: receiver.clone(),
            receiver_received,
        })
    }

    async fn load_snapshot(&self) -> Result<LedgerSnapshot, RepositoryError> {
        let rows = sqlx::query(
            "SELECT kind, user_id, count
             FROM recognition_tally
             ORDER BY kind, first_seen",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut snapshot = LedgerSnapshot::default();
        for row in &rows {
            let kind: String = row.try_get("kind").map_err(|e| RepositoryError::Decode(e.to_string()))?;
            let user_id: String =
                row.try_get("user_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
            let count: i64 = row.try_get("count").map_err(|e| RepositoryError::Decode(e.to_string()))?;
            let count = u64::try_from(count)
                .map_err(|_| RepositoryError::Decode(format!("negative count for `{user_id}`")))?;

            match kind.as_str() {
                KIND_GIVEN => snapshot.given_counts.set(UserId(user_id), count),
                KIND_RECEIVED => snapshot.received_counts.set(UserId(user_id), count),
                other => return Err(RepositoryError::Decode(format!("unknown tally kind `{other}`"))),
            }
        }

        Ok(snapshot)
    }
}

async fn increment(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    kind: &str,
    user: &UserId,
) -> Result<u64, RepositoryError> {
    let row = sqlx::query(
        "INSERT INTO recognition_tally (kind, user_id, count, first_seen)
         VALUES (?, ?, 1, (SELECT COALESCE(MAX(first_seen), 0) + 1 FROM recognition_tally WHERE kind = ?))
         ON CONFLICT(kind, user_id) DO UPDATE
            SET count = count + 1,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
         RETURNING count",
    )
    .bind(kind)
    .bind(user.as_str())
    .bind(kind)
    .fetch_one(&mut **tx)
    .await?;

    let count: i64 = row.try_get("count").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    u64::try_from(count).map_err(|_| RepositoryError::Decode(format!("negative count for `{user}`")))
}

#[async_trait::async_trait]
impl LedgerStore for SqlLedgerStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn record_event(
        &self,
        giver: &UserId,
        receiver: &UserId,
    ) -> Result<RecordedCounts, LedgerError> {
        validate_pair(giver, receiver)?;
        let _guard = self.write_lock.lock().await;
        Ok(self.record_in_transaction(giver, receiver).await?)
    }

    async fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        Ok(self.load_snapshot().await?)
    }

    async fn reset(&self) -> Result<(), LedgerError> {
        let _guard = self.write_lock.lock().await;
        sqlx::query("DELETE FROM recognition_tally")
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;
        Ok(())
    }
}
