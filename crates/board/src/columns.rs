//! Board columns and the partitioner that builds them.
//!
//! `Columns` is a total mapping from [`WorkflowState`] to an ordered sequence
//! of records. It is treated as an immutable value: every mutation produces a
//! new `Columns`, and records are shared between versions through `Arc` so a
//! caller holding an older version never observes a change.

use std::sync::Arc;

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use sigboard_storage::{Record, RecordId};

use crate::workflow::WorkflowState;

/// One column of the board: the records currently in `state`, in board order.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    state: WorkflowState,
    records: Vec<Arc<Record>>,
}

impl Column {
    pub fn new(state: WorkflowState) -> Self {
        Column {
            state,
            records: Vec::new(),
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of the record with identity `id` in this column.
    pub fn position_of(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|r| &r.id == id)
    }

    pub(crate) fn push(&mut self, record: Arc<Record>) {
        self.records.push(record);
    }

    pub(crate) fn insert(&mut self, index: usize, record: Arc<Record>) {
        let index = index.min(self.records.len());
        self.records.insert(index, record);
    }

    pub(crate) fn remove(&mut self, index: usize) -> Arc<Record> {
        self.records.remove(index)
    }

    pub(crate) fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&Arc<Record>) -> bool,
    {
        self.records.retain(keep);
    }
}

impl Serialize for Column {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let records: Vec<&Record> = self.records.iter().map(|r| r.as_ref()).collect();
        let mut s = serializer.serialize_struct("Column", 5)?;
        s.serialize_field("id", self.state.id())?;
        s.serialize_field("name", self.state.display_name())?;
        s.serialize_field("color", self.state.color())?;
        s.serialize_field("count", &self.records.len())?;
        s.serialize_field("records", &records)?;
        s.end()
    }
}

/// Every workflow state's column, in board order.
#[derive(Debug, Clone, PartialEq)]
pub struct Columns {
    columns: [Column; 5],
}

impl Default for Columns {
    fn default() -> Self {
        Self::empty()
    }
}

impl Columns {
    /// Five empty columns.
    pub fn empty() -> Self {
        Columns {
            columns: WorkflowState::ALL.map(Column::new),
        }
    }

    pub fn column(&self, state: WorkflowState) -> &Column {
        &self.columns[state.index()]
    }

    pub(crate) fn column_mut(&mut self, state: WorkflowState) -> &mut Column {
        &mut self.columns[state.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Every record on the board, column by column.
    pub fn records(&self) -> impl Iterator<Item = &Arc<Record>> {
        self.columns.iter().flat_map(|c| c.records.iter())
    }

    /// Total number of records across all columns.
    pub fn total(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// Locate a record by identity: its column, index and value.
    pub fn find(&self, id: &RecordId) -> Option<(WorkflowState, usize, &Arc<Record>)> {
        self.columns.iter().find_map(|column| {
            column
                .position_of(id)
                .map(|index| (column.state, index, &column.records[index]))
        })
    }
}

impl Serialize for Columns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.columns.iter())
    }
}

/// Bucket a flat record list into columns by status.
///
/// Stable: records keep their input order within a column. A record whose
/// status is not a known state identifier goes to the fallback column and
/// keeps its status text unchanged.
pub fn partition<I>(records: I) -> Columns
where
    I: IntoIterator<Item = Record>,
{
    let mut columns = Columns::empty();
    for record in records {
        let state = match WorkflowState::from_id(&record.status) {
            Some(state) => state,
            None => {
                tracing::warn!(
                    record_id = %record.id,
                    status = %record.status,
                    fallback = %WorkflowState::FALLBACK,
                    "unrecognized status, placing record in fallback column"
                );
                WorkflowState::FALLBACK
            }
        };
        columns.column_mut(state).push(Arc::new(record));
    }
    columns
}
