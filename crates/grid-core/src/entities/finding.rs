use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{QualityCheck, Severity};

/// Result of one validation check against a raw batch or snapshot.
///
/// Ephemeral: produced per run, surfaced in the run result and logs, never
/// persisted as first-class state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QualityFinding {
    pub check: QualityCheck,
    pub severity: Severity,
    pub description: String,
    pub affected_rows: u64,
}

impl QualityFinding {
    #[must_use]
    pub fn pass(check: QualityCheck) -> Self {
        Self {
            check,
            severity: Severity::Pass,
            description: String::new(),
            affected_rows: 0,
        }
    }

    #[must_use]
    pub fn warn(check: QualityCheck, description: impl Into<String>, affected_rows: u64) -> Self {
        Self {
            check,
            severity: Severity::Warn,
            description: description.into(),
            affected_rows,
        }
    }

    #[must_use]
    pub fn fail(check: QualityCheck, description: impl Into<String>, affected_rows: u64) -> Self {
        Self {
            check,
            severity: Severity::Fail,
            description: description.into(),
            affected_rows,
        }
    }

    /// Whether this finding blocks publication.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Fail
    }
}
