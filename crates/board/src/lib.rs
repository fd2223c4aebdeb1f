//! Signal board engine.
//!
//! Turns a flat snapshot of signal records into workflow columns, derives a
//! filtered projection, applies drag-and-drop moves against the master
//! columns, holds moves into `confirmed-event` until the operator annotates
//! them, and pushes committed moves back to the record store.
//!
//! Layering, leaves first:
//! - [`workflow`]: the closed set of states
//! - [`columns`]: column values and the partitioner
//! - [`filter`]: predicates, projection, candidates, memoization
//! - [`transition`]: identity-safe move application
//! - [`gate`]: the annotation state machine
//! - [`sync`]: store writes after a commit
//! - [`board`]: the facade a presentation layer drives
//! - [`views`]: read-only map and chart data
//! - [`adapter`]: store configuration and the HTTP store

pub mod adapter;
pub mod board;
pub mod columns;
pub mod filter;
pub mod gate;
pub mod sync;
pub mod transition;
pub mod views;
pub mod workflow;

pub use board::{Board, MoveOutcome};
pub use columns::{partition, Column, Columns};
pub use filter::{FilterCandidates, FilterKind, FilterSet};
pub use gate::{Annotation, GateError, GateState, PendingMove};
pub use sync::{Commit, LogNotifier, OperatorNotifier, PersistenceSync, SyncOutcome};
pub use transition::{MoveRequest, UnchangedReason};
pub use workflow::WorkflowState;

pub use sigboard_storage::{Record, RecordId, RecordStore, StoreError};
