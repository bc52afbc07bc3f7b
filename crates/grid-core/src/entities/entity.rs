use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::EntityKind;

/// A provider-independent identity: one player, team, or draft asset.
///
/// Long-lived reference data. Mutated only by explicit curation events, never
/// by ingestion traffic. `team` and `position` exist for disambiguation when
/// nominating crosswalk candidates, not as authoritative stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CanonicalEntity {
    pub canonical_id: String,
    pub kind: EntityKind,
    pub name: String,
    pub team: Option<String>,
    pub position: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
