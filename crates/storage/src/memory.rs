//! In-process record store.
//!
//! Holds records in memory and applies writes immediately. Writes can be made
//! to fail on demand so callers can exercise their failure paths without a
//! network.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::record::{Record, RecordId};
use crate::traits::RecordStore;

/// One write received by the store, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWrite {
    Status { id: RecordId, status: String },
    Description { id: RecordId, description: String },
}

#[derive(Default)]
struct Inner {
    records: Vec<Record>,
    writes: Vec<StoreWrite>,
    fail_list: Option<StoreError>,
    fail_writes: Option<StoreError>,
}

/// A [`RecordStore`] backed by a `Vec<Record>`.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new(records: Vec<Record>) -> Self {
        MemoryStore {
            inner: Mutex::new(Inner {
                records,
                ..Inner::default()
            }),
        }
    }

    /// Make every subsequent `list_records` call fail with `error`.
    pub async fn fail_list_with(&self, error: StoreError) {
        self.inner.lock().await.fail_list = Some(error);
    }

    /// Make every subsequent write fail with `error`. Failed writes are not
    /// applied and not recorded.
    pub async fn fail_writes_with(&self, error: StoreError) {
        self.inner.lock().await.fail_writes = Some(error);
    }

    /// Clear injected failures.
    pub async fn heal(&self) {
        let mut inner = self.inner.lock().await;
        inner.fail_list = None;
        inner.fail_writes = None;
    }

    /// Current records, as the store sees them.
    pub async fn records(&self) -> Vec<Record> {
        self.inner.lock().await.records.clone()
    }

    /// Every applied write, oldest first.
    pub async fn writes(&self) -> Vec<StoreWrite> {
        self.inner.lock().await.writes.clone()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_records(&self) -> Result<Vec<Record>, StoreError> {
        let inner = self.inner.lock().await;
        if let Some(err) = &inner.fail_list {
            return Err(err.clone());
        }
        Ok(inner.records.clone())
    }

    async fn update_status(&self, id: &RecordId, status: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(err) = &inner.fail_writes {
            return Err(err.clone());
        }
        let record = inner
            .records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        record.status = status.to_string();
        inner.writes.push(StoreWrite::Status {
            id: id.clone(),
            status: status.to_string(),
        });
        Ok(())
    }

    async fn update_description(&self, id: &RecordId, description: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(err) = &inner.fail_writes {
            return Err(err.clone());
        }
        let record = inner
            .records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        record.description = Some(description.to_string());
        inner.writes.push(StoreWrite::Description {
            id: id.clone(),
            description: description.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn update_status_applies_and_records_write() {
        let store = MemoryStore::new(vec![Record::new("1", "a", "intake")]);
        store
            .update_status(&RecordId::from("1"), "analysis")
            .await
            .unwrap();

        assert_eq!(store.records().await[0].status, "analysis");
        assert_eq!(
            store.writes().await,
            vec![StoreWrite::Status {
                id: RecordId::from("1"),
                status: "analysis".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn unknown_record_is_not_found() {
        let store = MemoryStore::new(vec![]);
        let err = store
            .update_status(&RecordId::from("9"), "analysis")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::NotFound {
                id: "9".to_string()
            }
        );
    }

    #[tokio::test]
    async fn injected_write_failure_leaves_records_untouched() {
        let store = MemoryStore::new(vec![Record::new("1", "a", "intake")]);
        store
            .fail_writes_with(StoreError::Transport("connection refused".to_string()))
            .await;

        let result = store.update_status(&RecordId::from("1"), "discarded").await;
        assert!(matches!(result, Err(StoreError::Transport(_))));
        assert_eq!(store.records().await[0].status, "intake");
        assert!(store.writes().await.is_empty());

        store.heal().await;
        assert!(store
            .update_status(&RecordId::from("1"), "discarded")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn injected_list_failure() {
        let store = MemoryStore::new(vec![Record::new("1", "a", "intake")]);
        store.fail_list_with(StoreError::Unauthorized).await;
        assert_eq!(store.list_records().await, Err(StoreError::Unauthorized));
    }
}
