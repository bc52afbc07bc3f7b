//! Quality gate configuration.

use serde::{Deserialize, Serialize};

const fn default_key_coverage_threshold() -> f64 {
    0.95
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QualityConfig {
    /// Minimum fraction of rows whose primary-key columns are all non-null.
    /// Batches below this fail the gate.
    #[serde(default = "default_key_coverage_threshold")]
    pub key_coverage_threshold: f64,

    /// When true, columns not declared in the contract fail the gate instead
    /// of being tolerated with a warning.
    #[serde(default)]
    pub strict_schema: bool,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            key_coverage_threshold: default_key_coverage_threshold(),
            strict_schema: false,
        }
    }
}
