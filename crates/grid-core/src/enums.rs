//! Severity, status, and type enums for Gridiron.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Enums stored in sidecars or trail files provide `as_str()` so the on-disk
//! representation never drifts from the serde one.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity of a quality finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Pass,
    Warn,
    Fail,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// QualityCheck
// ---------------------------------------------------------------------------

/// Which validation produced a finding.
///
/// `Freshness`, `EntityResolution`, and `Publication` findings come from the
/// runner (stale-data fallback, unresolved ids, idempotent republish), the
/// rest from the quality gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QualityCheck {
    SchemaCompliance,
    KeyUniqueness,
    KeyCoverage,
    EntityResolution,
    Freshness,
    Publication,
}

impl QualityCheck {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SchemaCompliance => "schema_compliance",
            Self::KeyUniqueness => "key_uniqueness",
            Self::KeyCoverage => "key_coverage",
            Self::EntityResolution => "entity_resolution",
            Self::Freshness => "freshness",
            Self::Publication => "publication",
        }
    }
}

impl fmt::Display for QualityCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RunStatus
// ---------------------------------------------------------------------------

/// Outcome of one (provider, dataset) ingestion run.
///
/// ```text
/// published                — fresh snapshot, no warnings
/// published_with_warnings  — fresh snapshot, warn findings present
/// lkg_fallback             — fetch or gate failed, prior snapshot served
/// failed                   — nothing published and nothing to fall back to
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Published,
    PublishedWithWarnings,
    LkgFallback,
    Failed,
}

impl RunStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::PublishedWithWarnings => "published_with_warnings",
            Self::LkgFallback => "lkg_fallback",
            Self::Failed => "failed",
        }
    }

    /// Whether the run left a usable snapshot behind (fresh or stale).
    #[must_use]
    pub const fn has_snapshot(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SemanticType
// ---------------------------------------------------------------------------

/// Declared value type of a contract column.
///
/// Rows in flight are dynamic JSON objects; compatibility is checked against
/// the JSON value shape. Dates and timestamps travel as ISO-8601 strings and
/// are converted to Arrow-native columns at publish time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Str,
    Int,
    Float,
    Bool,
    Date,
    Timestamp,
}

impl SemanticType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
        }
    }

    /// Whether a JSON value is acceptable for this column type.
    ///
    /// Null is always compatible; key-coverage checks deal with null keys
    /// separately. Ints are accepted where floats are declared.
    #[must_use]
    pub fn is_compatible(self, value: &serde_json::Value) -> bool {
        use serde_json::Value;
        match (self, value) {
            (_, Value::Null) => true,
            (Self::Str, Value::String(_)) | (Self::Bool, Value::Bool(_)) => true,
            (Self::Int, Value::Number(n)) => n.as_i64().is_some(),
            (Self::Float, Value::Number(_)) => true,
            (Self::Date, Value::String(s)) => {
                chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
            }
            (Self::Timestamp, Value::String(s)) => {
                chrono::DateTime::parse_from_rfc3339(s).is_ok()
            }
            _ => false,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// Kind of canonical entity tracked by the crosswalk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Team,
    DraftPick,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Team => "team",
            Self::DraftPick => "draft_pick",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CurationOp
// ---------------------------------------------------------------------------

/// Kind of mutation recorded in the crosswalk curation trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CurationOp {
    AddEntity,
    MapAlias,
    OverrideAlias,
}

impl CurationOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddEntity => "add_entity",
            Self::MapAlias => "map_alias",
            Self::OverrideAlias => "override_alias",
        }
    }
}

impl fmt::Display for CurationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
