//! In-memory trail of authorization decisions.
//!
//! Every `Acl::is_allowed` call appends one `DecisionRecord`. The trail is
//! append-only apart from an explicit `clear`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One authorization decision made by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Position in the trail, starting at 0. Keeps counting after `clear`.
    pub sequence: u64,

    /// Wall-clock time (UTC) the decision was made.
    pub timestamp: DateTime<Utc>,

    /// The entity ID exactly as the caller supplied it.
    pub entity_id: String,

    pub action: String,
    pub resource: String,

    /// False when the entity is not registered; such requests are denied.
    pub entity_known: bool,

    pub allowed: bool,
}

/// Append-only list of `DecisionRecord`s.
#[derive(Debug, Clone, Default)]
pub struct DecisionTrail {
    records: Vec<DecisionRecord>,
    next_sequence: u64,
}

impl DecisionTrail {
    /// Create an empty trail starting at sequence `0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decision and return the stored record.
    pub fn record(
        &mut self,
        entity_id: &str,
        action: &str,
        resource: &str,
        entity_known: bool,
        allowed: bool,
    ) -> &DecisionRecord {
        let record = DecisionRecord {
            sequence: self.next_sequence,
            timestamp: Utc::now(),
            entity_id: entity_id.to_string(),
            action: action.to_string(),
            resource: resource.to_string(),
            entity_known,
            allowed,
        };
        self.next_sequence += 1;
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// Recorded decisions, oldest first.
    pub fn records(&self) -> &[DecisionRecord] {
        &self.records
    }

    /// Drop recorded decisions without resetting the sequence counter.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Pretty-printed JSON array of all records.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }
}
