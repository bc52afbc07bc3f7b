//! Entity structs for Gridiron domain objects.

mod entity;
mod finding;
mod run;
mod snapshot;

pub use entity::CanonicalEntity;
pub use finding::QualityFinding;
pub use run::RunResult;
pub use snapshot::{SnapshotMeta, SnapshotRef};
