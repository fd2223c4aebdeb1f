//! Read-only renderings of the board's records: map markers, aggregate
//! counts for charts, and the risk tone used to color cards.

use std::collections::BTreeMap;

use serde::Serialize;
use sigboard_storage::{Record, RecordId};

use crate::columns::Columns;
use crate::workflow::WorkflowState;

/// Label used for records with no risk level.
pub const UNKNOWN_RISK: &str = "unknown";

/// A record placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    pub id: RecordId,
    pub title: String,
    pub neighborhood: Option<String>,
    pub risk_level: Option<String>,
    pub status: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Every record that has both coordinates, in board order.
pub fn map_markers(columns: &Columns) -> Vec<MapMarker> {
    columns
        .records()
        .filter_map(|r| {
            let (latitude, longitude) = r.position()?;
            Some(MapMarker {
                id: r.id.clone(),
                title: r.title.clone(),
                neighborhood: r.location_neighborhood.clone(),
                risk_level: r.risk_level.clone(),
                status: r.status.clone(),
                latitude,
                longitude,
            })
        })
        .collect()
}

/// One bar or slice of a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    pub name: String,
    pub value: usize,
}

/// Records per risk level, sorted by label. Absent or blank risk levels are
/// counted under [`UNKNOWN_RISK`].
pub fn counts_by_risk(columns: &Columns) -> Vec<Count> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in columns.records() {
        let label = record
            .risk_level
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(UNKNOWN_RISK);
        *counts.entry(label.to_string()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(name, value)| Count { name, value })
        .collect()
}

/// Records per workflow state, every state listed in board order.
pub fn counts_by_state(columns: &Columns) -> Vec<Count> {
    WorkflowState::ALL
        .into_iter()
        .map(|state| Count {
            name: state.id().to_string(),
            value: columns.column(state).len(),
        })
        .collect()
}

/// Severity bucket of a free-text risk label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTone {
    High,
    Medium,
    Low,
}

impl RiskTone {
    /// Case-insensitive substring match on `high`/`med`, high first.
    /// Anything else, including an absent label, is `Low`.
    pub fn of(risk_level: Option<&str>) -> RiskTone {
        let label = risk_level.unwrap_or_default().trim().to_lowercase();
        if label.contains("high") {
            RiskTone::High
        } else if label.contains("med") {
            RiskTone::Medium
        } else {
            RiskTone::Low
        }
    }

    pub fn of_record(record: &Record) -> RiskTone {
        RiskTone::of(record.risk_level.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::partition;

    fn located(id: &str, status: &str, lat: Option<f64>, lon: Option<f64>) -> Record {
        let mut r = Record::new(id, id, status);
        r.latitude = lat;
        r.longitude = lon;
        r
    }

    #[test]
    fn markers_require_both_coordinates() {
        let columns = partition(vec![
            located("a", "intake", Some(-3.1), Some(-60.0)),
            located("b", "intake", Some(-3.1), None),
            located("c", "discarded", None, None),
            located("d", "monitoring", Some(0.0), Some(0.0)),
        ]);
        let markers = map_markers(&columns);
        let ids: Vec<_> = markers.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
        assert_eq!(markers[1].latitude, 0.0);
    }

    #[test]
    fn risk_counts_bucket_unknown() {
        let mut high = Record::new("a", "a", "intake");
        high.risk_level = Some("High".to_string());
        let mut blank = Record::new("b", "b", "intake");
        blank.risk_level = Some(" ".to_string());
        let none = Record::new("c", "c", "analysis");

        let counts = counts_by_risk(&partition(vec![high, blank, none]));
        assert_eq!(
            counts,
            vec![
                Count {
                    name: "High".to_string(),
                    value: 1
                },
                Count {
                    name: UNKNOWN_RISK.to_string(),
                    value: 2
                },
            ]
        );
    }

    #[test]
    fn state_counts_include_empty_states() {
        let counts = counts_by_state(&partition(vec![Record::new("a", "a", "discarded")]));
        assert_eq!(counts.len(), 5);
        assert_eq!(counts[0].name, "intake");
        assert_eq!(counts[0].value, 0);
        assert_eq!(counts[4].value, 1);
    }

    #[test]
    fn risk_tone_matches_anywhere_in_label() {
        assert_eq!(RiskTone::of(Some("HIGH")), RiskTone::High);
        assert_eq!(RiskTone::of(Some("Very High")), RiskTone::High);
        assert_eq!(RiskTone::of(Some("medium-high")), RiskTone::High);
        assert_eq!(RiskTone::of(Some("Risk: Medium")), RiskTone::Medium);
        assert_eq!(RiskTone::of(Some("Medium")), RiskTone::Medium);
        assert_eq!(RiskTone::of(Some("Low")), RiskTone::Low);
        assert_eq!(RiskTone::of(None), RiskTone::Low);
    }
}
