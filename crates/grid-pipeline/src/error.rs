//! Pipeline error types.
//!
//! Quality-gate rejections are modeled as typed errors carrying their
//! findings so the runner can classify the fallback path while the operator
//! still sees every finding in the run result.

use grid_core::entities::QualityFinding;
use thiserror::Error;

/// Errors raised while executing one dataset run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The (provider, dataset) pair is not registered.
    #[error(transparent)]
    Registry(#[from] grid_registry::RegistryError),

    /// The contract names a loader path nothing is registered under.
    #[error("no loader registered for path {0}")]
    MissingLoader(String),

    /// Fetch failed (invalid parameters, terminal API error, or exhausted
    /// retries).
    #[error(transparent)]
    Provider(#[from] grid_providers::ProviderError),

    /// The batch violates the contract schema.
    #[error("schema violation in {provider}/{dataset}")]
    SchemaViolation {
        provider: String,
        dataset: String,
        findings: Vec<QualityFinding>,
    },

    /// Duplicate primary-key tuples within the batch.
    #[error("duplicate primary keys in {provider}/{dataset}")]
    KeyUniqueness {
        provider: String,
        dataset: String,
        findings: Vec<QualityFinding>,
    },

    /// Primary-key coverage below the configured threshold.
    #[error("key coverage below threshold in {provider}/{dataset}")]
    KeyCoverage {
        provider: String,
        dataset: String,
        findings: Vec<QualityFinding>,
    },

    /// Snapshot store failure.
    #[error(transparent)]
    Lake(#[from] grid_lake::LakeError),
}

impl PipelineError {
    /// Findings carried by gate-rejection errors, empty otherwise.
    #[must_use]
    pub fn findings(&self) -> &[QualityFinding] {
        match self {
            Self::SchemaViolation { findings, .. }
            | Self::KeyUniqueness { findings, .. }
            | Self::KeyCoverage { findings, .. } => findings,
            _ => &[],
        }
    }

    /// Whether the last-known-good fallback applies: the store is intact and
    /// a prior snapshot is still the best answer.
    #[must_use]
    pub const fn triggers_lkg(&self) -> bool {
        matches!(
            self,
            Self::Provider(grid_providers::ProviderError::SourceUnavailable { .. })
                | Self::SchemaViolation { .. }
                | Self::KeyUniqueness { .. }
                | Self::KeyCoverage { .. }
        )
    }
}
