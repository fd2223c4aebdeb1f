//! The closed set of workflow states a signal moves through.
//!
//! Every state owns exactly one board column. Status strings coming from the
//! store are resolved against this set; nothing outside it can create a
//! column.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Workflow state of a signal, in board order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowState {
    /// Newly reported, unreviewed.
    Intake,
    /// Under active analysis.
    Analysis,
    /// Worth tracking, under ongoing observation.
    Monitoring,
    /// Terminal: validated as a real public-health event.
    ConfirmedEvent,
    /// Terminal: ruled out.
    Discarded,
}

impl WorkflowState {
    /// All states in column order.
    pub const ALL: [WorkflowState; 5] = [
        WorkflowState::Intake,
        WorkflowState::Analysis,
        WorkflowState::Monitoring,
        WorkflowState::ConfirmedEvent,
        WorkflowState::Discarded,
    ];

    /// Column that receives records whose status is not recognized.
    pub const FALLBACK: WorkflowState = WorkflowState::Intake;

    /// Stable identifier, as stored in a record's `status` field.
    pub fn id(self) -> &'static str {
        match self {
            WorkflowState::Intake => "intake",
            WorkflowState::Analysis => "analysis",
            WorkflowState::Monitoring => "monitoring",
            WorkflowState::ConfirmedEvent => "confirmed-event",
            WorkflowState::Discarded => "discarded",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            WorkflowState::Intake => "Reported (Intake)",
            WorkflowState::Analysis => "Under Analysis",
            WorkflowState::Monitoring => "Monitoring",
            WorkflowState::ConfirmedEvent => "Confirmed Events",
            WorkflowState::Discarded => "Discarded",
        }
    }

    /// Column header color, as a CSS hex string.
    pub fn color(self) -> &'static str {
        match self {
            WorkflowState::Intake => "#f5f5f5",
            WorkflowState::Analysis => "#e3f2fd",
            WorkflowState::Monitoring => "#fff3e0",
            WorkflowState::ConfirmedEvent => "#e8f5e9",
            WorkflowState::Discarded => "#ffebee",
        }
    }

    /// Position of this state's column on the board.
    pub fn index(self) -> usize {
        match self {
            WorkflowState::Intake => 0,
            WorkflowState::Analysis => 1,
            WorkflowState::Monitoring => 2,
            WorkflowState::ConfirmedEvent => 3,
            WorkflowState::Discarded => 4,
        }
    }

    /// Exact match against the state identifiers.
    pub fn from_id(id: &str) -> Option<WorkflowState> {
        WorkflowState::ALL.into_iter().find(|s| s.id() == id)
    }

    /// Column a status string belongs to; unrecognized values fall back to
    /// [`WorkflowState::FALLBACK`].
    pub fn resolve(status: &str) -> WorkflowState {
        WorkflowState::from_id(status).unwrap_or(WorkflowState::FALLBACK)
    }

    /// Whether moving from `from` into `to` needs an operator annotation.
    ///
    /// Only entry into `confirmed-event` is gated; reordering inside that
    /// column is not.
    pub fn requires_annotation(from: WorkflowState, to: WorkflowState) -> bool {
        to == WorkflowState::ConfirmedEvent && from != WorkflowState::ConfirmedEvent
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error for a string that is not one of the workflow state identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown workflow state '{0}' (expected one of: intake, analysis, monitoring, confirmed-event, discarded)")]
pub struct UnknownState(pub String);

impl FromStr for WorkflowState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkflowState::from_id(s).ok_or_else(|| UnknownState(s.to_string()))
    }
}
