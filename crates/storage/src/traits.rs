use async_trait::async_trait;

use crate::error::StoreError;
use crate::record::{Record, RecordId};

/// The record store consumed by the board.
///
/// The store is the only durable copy of a record. The board never creates or
/// deletes records; it reads the full snapshot once per load and writes single
/// fields back after optimistic local moves.
///
/// ## Write semantics
///
/// Each write is independent: there is no transaction, no version check and
/// no de-duplication. Two updates for the same record issued back to back may
/// land in either order and the last one to be applied wins.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` so a store can be shared
/// with background persistence tasks.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Fetch the full snapshot of records. No pagination.
    async fn list_records(&self) -> Result<Vec<Record>, StoreError>;

    /// Replace one record's workflow status.
    ///
    /// `status` is the raw state identifier, sent as plain text.
    async fn update_status(&self, id: &RecordId, status: &str) -> Result<(), StoreError>;

    /// Replace one record's description.
    ///
    /// Used after an annotated transition so the appended justification is
    /// durable alongside the status.
    async fn update_description(&self, id: &RecordId, description: &str) -> Result<(), StoreError>;
}
