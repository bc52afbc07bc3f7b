//! JSONL curation trail envelope.
//!
//! Every crosswalk mutation is recorded as a `CurationEvent` in a JSONL trail
//! file before the in-memory state changes. The crosswalk store is rebuildable
//! by replaying the trail in timestamp order.
//!
//! The `v` field supports envelope versioning: old trail files without a `v`
//! field deserialize with `v == 1` via `#[serde(default)]`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::CurationOp;

/// Default trail version for backward compatibility with old JSONL files.
const fn default_trail_version() -> u32 {
    1
}

/// A single operation recorded in the curation trail.
///
/// For `AddEntity` ops, `data` holds the full `CanonicalEntity`; for alias
/// ops it is null and the `provider`/`native_id` fields carry the mapping.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CurationEvent {
    /// Envelope version. Defaults to 1 for old trails without this field.
    #[serde(default = "default_trail_version")]
    pub v: u32,

    pub ts: DateTime<Utc>,

    pub op: CurationOp,

    /// Provider whose native id is being mapped. Absent for `AddEntity`.
    pub provider: Option<String>,

    /// Provider-native identifier being mapped. Absent for `AddEntity`.
    pub native_id: Option<String>,

    /// Canonical entity this event concerns.
    pub canonical_id: String,

    /// Event payload. Schema depends on `op`.
    pub data: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curation_event_roundtrip() {
        let event = CurationEvent {
            v: 1,
            ts: "2024-10-01T06:00:00Z".parse().unwrap(),
            op: CurationOp::MapAlias,
            provider: Some("sleeper".to_string()),
            native_id: Some("4046".to_string()),
            canonical_id: "ply-josh-allen".to_string(),
            data: serde_json::Value::Null,
        };

        let json = serde_json::to_string(&event).unwrap();
        let recovered: CurationEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, event);
    }

    #[test]
    fn curation_event_default_version() {
        // Old trail format without `v` field should deserialize with v=1
        let json = r#"{"ts":"2024-01-01T00:00:00Z","op":"map_alias","provider":"ktc","native_id":"812","canonical_id":"ply-x","data":null}"#;
        let event: CurationEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.v, 1);
    }

    #[test]
    fn curation_event_all_ops_serialize() {
        for op in [
            CurationOp::AddEntity,
            CurationOp::MapAlias,
            CurationOp::OverrideAlias,
        ] {
            let event = CurationEvent {
                v: 1,
                ts: Utc::now(),
                op,
                provider: None,
                native_id: None,
                canonical_id: String::new(),
                data: serde_json::Value::Null,
            };
            let json = serde_json::to_string(&event).unwrap();
            let recovered: CurationEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(recovered.op, op);
        }
    }
}
