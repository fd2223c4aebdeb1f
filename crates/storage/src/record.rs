use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque, stable identity of a signal record.
///
/// Stores hand out identities either as JSON numbers (database sequences) or
/// as strings; both are normalized to their textual form so that equality is
/// independent of the wire representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId(s)
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        RecordId(n.to_string())
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match WireId::deserialize(deserializer)? {
            WireId::Text(s) => RecordId(s),
            WireId::Unsigned(n) => RecordId(n.to_string()),
            WireId::Signed(n) => RecordId(n.to_string()),
        })
    }
}

/// A signal report as served by the record store.
///
/// `status` is kept verbatim: the board resolves it against the closed set
/// of workflow states, and an unrecognized value is never rewritten here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// ISO 8601 / RFC 3339 timestamp string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_at: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub location_neighborhood: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Record {
    /// Minimal record with only identity, title and status set.
    pub fn new(id: impl Into<RecordId>, title: &str, status: &str) -> Self {
        Record {
            id: id.into(),
            title: title.to_string(),
            description: None,
            detected_at: None,
            status: status.to_string(),
            risk_level: None,
            source_name: None,
            location_neighborhood: None,
            latitude: None,
            longitude: None,
        }
    }

    /// Both coordinates present.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}
