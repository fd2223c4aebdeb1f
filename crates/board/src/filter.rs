//! Filtered projection of the board.
//!
//! A filter is a conjunction of at most two equality predicates, on the
//! record's source name and on its risk level. The projection shares record
//! values with the master columns and never alters them.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sigboard_storage::Record;

use crate::columns::Columns;

/// Which predicate a filter value applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    /// `sourceName == value`
    Source,
    /// `riskLevel == value`
    Risk,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Source => f.write_str("source"),
            FilterKind::Risk => f.write_str("risk"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter kind '{0}' (expected 'source' or 'risk')")]
pub struct UnknownFilterKind(pub String);

impl FromStr for FilterKind {
    type Err = UnknownFilterKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source" => Ok(FilterKind::Source),
            "risk" => Ok(FilterKind::Risk),
            other => Err(UnknownFilterKind(other.to_string())),
        }
    }
}

/// The active filter predicates. Empty values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSet {
    pub source_name: Option<String>,
    pub risk_level: Option<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterSet::set`].
    pub fn with(mut self, kind: FilterKind, value: &str) -> Self {
        self.set(kind, Some(value));
        self
    }

    /// Set or clear one predicate. `None` and blank strings clear it.
    pub fn set(&mut self, kind: FilterKind, value: Option<&str>) {
        let value = non_blank(value).map(str::to_string);
        match kind {
            FilterKind::Source => self.source_name = value,
            FilterKind::Risk => self.risk_level = value,
        }
    }

    pub fn get(&self, kind: FilterKind) -> Option<&str> {
        match kind {
            FilterKind::Source => self.source_name.as_deref(),
            FilterKind::Risk => self.risk_level.as_deref(),
        }
    }

    pub fn clear(&mut self) {
        self.source_name = None;
        self.risk_level = None;
    }

    /// True when at least one predicate is set.
    pub fn is_active(&self) -> bool {
        self.source_name.is_some() || self.risk_level.is_some()
    }

    /// Conjunction of the active predicates. An empty set matches everything.
    pub fn matches(&self, record: &Record) -> bool {
        let source_ok = match &self.source_name {
            Some(want) => record.source_name.as_deref() == Some(want.as_str()),
            None => true,
        };
        let risk_ok = match &self.risk_level {
            Some(want) => record.risk_level.as_deref() == Some(want.as_str()),
            None => true,
        };
        source_ok && risk_ok
    }
}

/// Project `master` through `filter`.
///
/// With no active predicate the projection is `master` itself (the same
/// `Arc`), not a copy.
pub fn derive_view(master: &Arc<Columns>, filter: &FilterSet) -> Arc<Columns> {
    if !filter.is_active() {
        return Arc::clone(master);
    }
    let mut view = Columns::clone(master);
    for state in crate::workflow::WorkflowState::ALL {
        view.column_mut(state).retain(|r| filter.matches(r));
    }
    Arc::new(view)
}

/// Distinct non-empty values available to each filter control, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCandidates {
    pub source_names: Vec<String>,
    pub risk_levels: Vec<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Scan every record on the board for candidate filter values.
pub fn collect_candidates(columns: &Columns) -> FilterCandidates {
    let mut sources = BTreeSet::new();
    let mut risks = BTreeSet::new();
    for record in columns.records() {
        if let Some(s) = non_blank(record.source_name.as_deref()) {
            sources.insert(s.to_string());
        }
        if let Some(r) = non_blank(record.risk_level.as_deref()) {
            risks.insert(r.to_string());
        }
    }
    FilterCandidates {
        source_names: sources.into_iter().collect(),
        risk_levels: risks.into_iter().collect(),
    }
}

/// Memoized filtered view and candidate lists.
///
/// Keyed on the identity of the master `Arc` and on the filter values: the
/// projection is recomputed only when either changes, and the candidates only
/// when the master changes.
#[derive(Debug, Clone)]
pub struct ViewCache {
    master: Arc<Columns>,
    filter: FilterSet,
    view: Arc<Columns>,
    candidates: FilterCandidates,
    projections: usize,
}

impl ViewCache {
    pub fn new(master: &Arc<Columns>) -> Self {
        ViewCache {
            master: Arc::clone(master),
            filter: FilterSet::default(),
            view: Arc::clone(master),
            candidates: collect_candidates(master),
            projections: 0,
        }
    }

    /// Bring the cache up to date with `master` and `filter`.
    pub fn refresh(&mut self, master: &Arc<Columns>, filter: &FilterSet) {
        let master_changed = !Arc::ptr_eq(&self.master, master);
        if master_changed {
            self.master = Arc::clone(master);
            self.candidates = collect_candidates(master);
        }
        if master_changed || &self.filter != filter {
            self.filter = filter.clone();
            self.view = derive_view(master, filter);
            if filter.is_active() {
                self.projections += 1;
            }
        }
    }

    pub fn view(&self) -> &Arc<Columns> {
        &self.view
    }

    pub fn candidates(&self) -> &FilterCandidates {
        &self.candidates
    }

    /// Number of filtered projections computed so far.
    pub fn projections(&self) -> usize {
        self.projections
    }
}
