//! Persistence sync: pushes committed moves to the record store.
//!
//! Consistency contract (at-least-once, client wins):
//!
//! - the board is updated first, optimistically, and is never rolled back;
//! - the store is then told about the new status (and, for annotated moves,
//!   the new description);
//! - a failed write is reported to the operator and otherwise dropped: no
//!   retry, no backoff, no local undo. Board and store may disagree until the
//!   next full reload;
//! - writes are neither serialized nor de-duplicated. Two quick moves of one
//!   record race at the store and the last write applied wins.

use std::sync::Arc;

use serde::Serialize;
use sigboard_storage::{RecordId, RecordStore, StoreError};

use crate::workflow::WorkflowState;

/// What the store must learn about one committed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub record_id: RecordId,
    pub status: WorkflowState,
    /// Full annotated description; set only for gated moves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Receives blocking, user-visible failure notices.
pub trait OperatorNotifier: Send + Sync {
    fn sync_failed(&self, commit: &Commit, error: &StoreError);
}

/// Notifier that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl OperatorNotifier for LogNotifier {
    fn sync_failed(&self, commit: &Commit, error: &StoreError) {
        tracing::error!(
            record_id = %commit.record_id,
            status = %commit.status,
            error = %error,
            "failed to save move; the board keeps the new position until reload"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Persisted,
    Failed(StoreError),
}

impl SyncOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, SyncOutcome::Persisted)
    }
}

/// Sends commits to a [`RecordStore`].
#[derive(Clone)]
pub struct PersistenceSync {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn OperatorNotifier>,
}

impl PersistenceSync {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_notifier(store, Arc::new(LogNotifier))
    }

    pub fn with_notifier(store: Arc<dyn RecordStore>, notifier: Arc<dyn OperatorNotifier>) -> Self {
        PersistenceSync { store, notifier }
    }

    /// Write `commit` to the store once.
    ///
    /// The status goes first; the description is only written if the status
    /// write succeeded. Any failure is handed to the notifier.
    pub async fn persist(&self, commit: &Commit) -> SyncOutcome {
        let result = self.write(commit).await;
        match result {
            Ok(()) => {
                tracing::debug!(
                    record_id = %commit.record_id,
                    status = %commit.status,
                    "move saved"
                );
                SyncOutcome::Persisted
            }
            Err(error) => {
                self.notifier.sync_failed(commit, &error);
                SyncOutcome::Failed(error)
            }
        }
    }

    async fn write(&self, commit: &Commit) -> Result<(), StoreError> {
        self.store
            .update_status(&commit.record_id, commit.status.id())
            .await?;
        if let Some(description) = &commit.description {
            self.store
                .update_description(&commit.record_id, description)
                .await?;
        }
        Ok(())
    }

    /// Fire-and-forget [`PersistenceSync::persist`] on the tokio runtime.
    ///
    /// The handle may be dropped; failures still reach the notifier.
    #[cfg(feature = "adapter")]
    pub fn spawn(&self, commit: Commit) -> tokio::task::JoinHandle<SyncOutcome> {
        let sync = self.clone();
        tokio::spawn(async move { sync.persist(&commit).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigboard_storage::{MemoryStore, Record, StoreWrite};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl OperatorNotifier for Recorder {
        fn sync_failed(&self, commit: &Commit, error: &StoreError) {
            self.0
                .lock()
                .unwrap()
                .push(format!("{}: {}", commit.record_id, error));
        }
    }

    fn commit(id: &str, status: WorkflowState, description: Option<&str>) -> Commit {
        Commit {
            record_id: RecordId::from(id),
            status,
            description: description.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn status_only_commit_writes_status() {
        let store = Arc::new(MemoryStore::new(vec![Record::new("1", "a", "intake")]));
        let sync = PersistenceSync::new(store.clone());

        let outcome = sync
            .persist(&commit("1", WorkflowState::Analysis, None))
            .await;

        assert!(outcome.is_persisted());
        assert_eq!(
            store.writes().await,
            vec![StoreWrite::Status {
                id: RecordId::from("1"),
                status: "analysis".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn annotated_commit_writes_status_then_description() {
        let store = Arc::new(MemoryStore::new(vec![Record::new("1", "a", "monitoring")]));
        let sync = PersistenceSync::new(store.clone());

        sync.persist(&commit("1", WorkflowState::ConfirmedEvent, Some("note")))
            .await;

        let writes = store.writes().await;
        assert_eq!(writes.len(), 2);
        assert!(matches!(writes[0], StoreWrite::Status { .. }));
        assert!(matches!(writes[1], StoreWrite::Description { .. }));
        assert_eq!(
            store.records().await[0].description.as_deref(),
            Some("note")
        );
    }

    #[tokio::test]
    async fn failure_notifies_once_without_retry() {
        let store = Arc::new(MemoryStore::new(vec![Record::new("1", "a", "intake")]));
        store
            .fail_writes_with(StoreError::Transport("down".to_string()))
            .await;
        let recorder = Arc::new(Recorder::default());
        let sync = PersistenceSync::with_notifier(store.clone(), recorder.clone());

        let outcome = sync
            .persist(&commit("1", WorkflowState::Discarded, Some("lost")))
            .await;

        assert_eq!(
            outcome,
            SyncOutcome::Failed(StoreError::Transport("down".to_string()))
        );
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec!["1: transport error: down".to_string()]
        );
        assert!(store.writes().await.is_empty());
    }

    #[cfg(feature = "adapter")]
    #[tokio::test]
    async fn spawned_sync_completes_in_background() {
        let store = Arc::new(MemoryStore::new(vec![Record::new("1", "a", "intake")]));
        let sync = PersistenceSync::new(store.clone());

        let handle = sync.spawn(commit("1", WorkflowState::Monitoring, None));
        assert_eq!(handle.await.unwrap(), SyncOutcome::Persisted);
        assert_eq!(store.records().await[0].status, "monitoring");
    }
}
