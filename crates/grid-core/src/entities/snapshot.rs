use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Sidecar metadata published next to every snapshot data file.
///
/// This is the bit-exact contract consumed by the downstream transformation
/// layer; field names must not change without coordinating there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SnapshotMeta {
    pub dataset: String,
    /// Capture timestamp (UTC) of the batch this snapshot was built from.
    pub asof_datetime: DateTime<Utc>,
    /// Logical identifier of the producing loader, e.g. `providers/sleeper/rosters`.
    pub loader_path: String,
    pub source_name: String,
    pub source_version: String,
    /// Path of the data file relative to the storage root.
    pub output_path: String,
    pub row_count: u64,
    /// Full SHA-256 of the encoded data file. The first 16 hex chars are the
    /// content identifier embedded in file names.
    pub content_sha256: String,
}

/// Handle to one published snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SnapshotRef {
    pub provider: String,
    pub dataset: String,
    pub as_of: NaiveDate,
    pub content_id: String,
    pub data_path: String,
    pub meta: SnapshotMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_field_names_are_stable() {
        let meta = SnapshotMeta {
            dataset: "rosters".to_string(),
            asof_datetime: "2024-10-01T06:00:00Z".parse().unwrap(),
            loader_path: "providers/sleeper/rosters".to_string(),
            source_name: "sleeper".to_string(),
            source_version: "v1".to_string(),
            output_path: "sleeper/rosters/dt=2024-10-01/rosters_abc123.arrow".to_string(),
            row_count: 12,
            content_sha256: "abc123".to_string(),
        };
        let json = serde_json::to_value(&meta).unwrap();
        for field in [
            "dataset",
            "asof_datetime",
            "loader_path",
            "source_name",
            "source_version",
            "output_path",
            "row_count",
            "content_sha256",
        ] {
            assert!(json.get(field).is_some(), "missing sidecar field {field}");
        }
    }
}
