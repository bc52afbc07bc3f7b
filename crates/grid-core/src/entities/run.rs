use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{QualityFinding, SnapshotRef};
use crate::enums::{RunStatus, Severity};

/// Outcome of one (provider, dataset) ingestion run, consumed by external
/// scheduling infrastructure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunResult {
    pub provider: String,
    pub dataset: String,
    pub as_of: NaiveDate,
    pub status: RunStatus,
    pub findings: Vec<QualityFinding>,
    /// The snapshot this run leaves visible: freshly published, or the prior
    /// last-known-good on fallback. `None` only when `status == Failed`.
    pub snapshot: Option<SnapshotRef>,
}

impl RunResult {
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Warn)
    }

    #[must_use]
    pub fn blocking_findings(&self) -> Vec<&QualityFinding> {
        self.findings.iter().filter(|f| f.is_blocking()).collect()
    }
}
