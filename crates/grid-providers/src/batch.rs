//! The in-flight result of one loader invocation.

use chrono::{DateTime, Utc};

/// Ordered rows produced by one fetch, tagged with capture time and a
/// source-version marker. Conforms structurally (not yet validated) to the
/// dataset contract; consumed and discarded once written to a snapshot.
#[derive(Debug, Clone)]
pub struct RawBatch {
    pub provider: String,
    pub dataset: String,
    pub loader_path: String,
    /// Upstream version marker: ETag, Last-Modified, artifact name, or
    /// `"unversioned"` when the source exposes nothing.
    pub source_version: String,
    pub captured_at: DateTime<Utc>,
    pub rows: Vec<serde_json::Value>,
}

impl RawBatch {
    #[must_use]
    pub fn new(
        provider: impl Into<String>,
        dataset: impl Into<String>,
        loader_path: impl Into<String>,
        source_version: impl Into<String>,
        rows: Vec<serde_json::Value>,
    ) -> Self {
        Self {
            provider: provider.into(),
            dataset: dataset.into(),
            loader_path: loader_path.into(),
            source_version: source_version.into(),
            captured_at: Utc::now(),
            rows,
        }
    }

    #[must_use]
    pub fn row_count(&self) -> u64 {
        self.rows.len() as u64
    }
}
