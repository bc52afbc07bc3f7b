//! Dataset contract types.

use grid_core::enums::{EntityKind, SemanticType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One declared column: name and semantic value type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnSpec {
    pub name: String,
    pub ty: SemanticType,
}

impl ColumnSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: SemanticType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Declares which column of a dataset carries a provider-native entity id,
/// and what kind of canonical entity it refers to. Datasets without an entity
/// reference (league settings, transaction logs) skip crosswalk annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EntityRef {
    pub column: String,
    pub kind: EntityKind,
}

/// The contract for one (provider, dataset): declared schema, primary key,
/// and the loader responsible for producing rows.
///
/// Immutable after registration. Contract changes ship as a new deployment of
/// the registry, never as in-place mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DatasetContract {
    pub provider: String,
    pub dataset: String,
    /// Logical identifier of the producing loader, e.g.
    /// `providers/sleeper/rosters`. Matched against the loader's declared
    /// path at dispatch time.
    pub loader_path: String,
    /// Column set that must uniquely identify a row within one snapshot.
    pub primary_key: Vec<String>,
    /// Declaration order is preserved; it becomes the column order of the
    /// published Arrow files.
    pub schema: Vec<ColumnSpec>,
    pub entity_ref: Option<EntityRef>,
}

impl DatasetContract {
    /// Look up a declared column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.schema.iter().find(|c| c.name == name)
    }

    /// Whether every primary-key column is declared in the schema.
    #[must_use]
    pub fn primary_key_is_declared(&self) -> bool {
        self.primary_key.iter().all(|k| self.column(k).is_some())
    }
}
