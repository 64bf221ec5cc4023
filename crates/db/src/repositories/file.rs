use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use highfive_core::domain::recognition::UserId;
use highfive_core::errors::LedgerError;
use highfive_core::ledger::{LedgerSnapshot, RecordedCounts};

use super::{validate_pair, LedgerStore, RepositoryError};

/// Whole-record JSON ledger: `{ "given_counts": {..}, "received_counts": {..} }`.
///
/// Every write replaces the file through a temp file and rename, so a failed
/// write leaves the previous record in place.
pub struct JsonFileLedgerStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<LedgerSnapshot, RepositoryError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Ok(LedgerSnapshot::default());
            }
            Err(source) => return Err(RepositoryError::Io { path: self.path.clone(), source }),
        };

        serde_json::from_slice(&raw)
            .map_err(|source| RepositoryError::Corrupt { path: self.path.clone(), source })
    }

    async fn write(&self, snapshot: &LedgerSnapshot) -> Result<(), RepositoryError> {
        let encoded = serde_json::to_vec_pretty(snapshot)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;

        let staging = staging_path(&self.path);
        tokio::fs::write(&staging, encoded)
            .await
            .map_err(|source| RepositoryError::Io { path: staging.clone(), source })?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|source| RepositoryError::Io { path: self.path.clone(), source })
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait::async_trait]
impl LedgerStore for JsonFileLedgerStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn record_event(
        &self,
        giver: &UserId,
        receiver: &UserId,
    ) -> Result<RecordedCounts, LedgerError> {
        validate_pair(giver, receiver)?;
        let _guard = self.lock.lock().await;

        let mut snapshot = self.read().await?;
        let counts = snapshot.record(giver, receiver);
        self.write(&snapshot).await?;
        Ok(counts)
    }

    async fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?)
    }

    async fn reset(&self) -> Result<(), LedgerError> {
        let _guard = self.lock.lock().await;
        Ok(self.write(&LedgerSnapshot::default()).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use highfive_core::domain::recognition::UserId;
    use highfive_core::errors::LedgerError;
    use tempfile::TempDir;

    use super::staging_path;
    use crate::repositories::{JsonFileLedgerStore, LedgerStore};

    fn user(id: &str) -> UserId {
        UserId(id.to_owned())
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_ledger() {
        let dir = TempDir::new().expect("tempdir");
        let store = JsonFileLedgerStore::new(dir.path().join("ledger.json"));
        assert!(store.snapshot().await.expect("snapshot").is_empty());
    }

    #[tokio::test]
    async fn records_survive_a_fresh_store_instance() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("ledger.json");

        let store = JsonFileLedgerStore::new(&path);
        for (giver, receiver) in [("A", "B"), ("A", "C"), ("D", "B")] {
            store.record_event(&user(giver), &user(receiver)).await.expect("record");
        }
        drop(store);

        let reopened = JsonFileLedgerStore::new(&path);
        let snapshot = reopened.snapshot().await.expect("snapshot");
        assert_eq!(snapshot.given_counts.get(&user("A")), 2);
        assert_eq!(snapshot.given_counts.get(&user("D")), 1);
        assert_eq!(snapshot.received_counts.get(&user("B")), 2);
        let order: Vec<&str> = snapshot.received_counts.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["B", "C"]);
        assert!(!staging_path(&path).exists(), "staging file should be renamed away");
    }

    #[tokio::test]
    async fn corrupt_file_is_a_persistence_error_and_is_left_untouched() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("ledger.json");
        fs::write(&path, "{ not json").expect("write corrupt file");

        let store = JsonFileLedgerStore::new(&path);
        let error = store.record_event(&user("A"), &user("B")).await.expect_err("must fail");
        assert!(matches!(error, LedgerError::Persistence(ref message) if message.contains("corrupt")));
        assert!(matches!(store.snapshot().await, Err(LedgerError::Persistence(_))));
        assert_eq!(fs::read_to_string(&path).expect("read back"), "{ not json");
    }

    #[tokio::test]
    async fn reset_writes_an_empty_record() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("ledger.json");
        let store = JsonFileLedgerStore::new(&path);
        store.record_event(&user("A"), &user("B")).await.expect("record");

        store.reset().await.expect("reset");
        let raw = fs::read_to_string(&path).expect("read ledger");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(value, serde_json::json!({ "given_counts": {}, "received_counts": {} }));
    }
}
