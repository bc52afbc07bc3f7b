//! Snapshot storage configuration.

use serde::{Deserialize, Serialize};

fn default_root() -> String {
    String::from(".gridiron/lake")
}

fn default_staging_prefix() -> String {
    String::from("_staging")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Storage root: a plain local path, a `file://` URI, or an
    /// `s3://bucket/prefix` URI. The snapshot store treats all three
    /// uniformly.
    #[serde(default = "default_root")]
    pub root: String,

    /// Prefix under the root where in-flight writes land before the atomic
    /// publish rename. Never visible to readers.
    #[serde(default = "default_staging_prefix")]
    pub staging_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            staging_prefix: default_staging_prefix(),
        }
    }
}

impl StorageConfig {
    /// Whether the root points at remote object storage rather than the
    /// local filesystem.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.root.starts_with("s3://")
    }
}
