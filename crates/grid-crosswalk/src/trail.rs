//! JSONL curation trail persistence.
//!
//! Appends `CurationEvent` records to `{dir}/curation.jsonl` using
//! `serde_jsonlines::append_json_lines` for per-line appends. The trail is
//! the source of truth; the in-memory crosswalk state is rebuilt from it at
//! load time.

use std::path::{Path, PathBuf};

use grid_core::trail::CurationEvent;

use crate::error::CrosswalkError;

const TRAIL_FILE: &str = "curation.jsonl";

/// Appends curation events to the trail file.
///
/// Every crosswalk mutation calls `append()` before the in-memory state
/// changes, so a crash can lose at most an unacknowledged write, never
/// acknowledge one that isn't durable.
#[derive(Debug)]
pub struct CurationTrail {
    path: PathBuf,
    enabled: bool,
}

impl CurationTrail {
    /// Create a trail writer rooted at `dir`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::Io`] if the directory cannot be created.
    pub fn new(dir: &Path) -> Result<Self, CrosswalkError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(TRAIL_FILE),
            enabled: true,
        })
    }

    /// A disabled writer for ephemeral in-memory crosswalks (tests, dry
    /// runs).
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            path: PathBuf::new(),
            enabled: false,
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append one event.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::Io`] if the file write fails.
    pub fn append(&self, event: &CurationEvent) -> Result<(), CrosswalkError> {
        if !self.enabled {
            return Ok(());
        }
        serde_jsonlines::append_json_lines(&self.path, [event])?;
        Ok(())
    }

    /// Read every event, sorted by timestamp ascending.
    ///
    /// Returns an empty vec when the trail file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::Io`] on unreadable or malformed trail files.
    pub fn read_all(&self) -> Result<Vec<CurationEvent>, CrosswalkError> {
        if !self.enabled || !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut events: Vec<CurationEvent> = serde_jsonlines::json_lines(&self.path)?
            .collect::<Result<Vec<_>, _>>()?;
        events.sort_by_key(|e| e.ts);
        Ok(events)
    }

    /// The trail file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use grid_core::enums::CurationOp;

    fn event(canonical_id: &str) -> CurationEvent {
        CurationEvent {
            v: 1,
            ts: Utc::now(),
            op: CurationOp::MapAlias,
            provider: Some("sleeper".to_string()),
            native_id: Some("4046".to_string()),
            canonical_id: canonical_id.to_string(),
            data: serde_json::Value::Null,
        }
    }

    #[test]
    fn append_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let trail = CurationTrail::new(dir.path()).unwrap();

        trail.append(&event("ply-a")).unwrap();
        trail.append(&event("ply-b")).unwrap();

        let events = trail.read_all().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].canonical_id, "ply-a");
        assert_eq!(events[1].canonical_id, "ply-b");
    }

    #[test]
    fn missing_trail_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let trail = CurationTrail::new(dir.path()).unwrap();
        assert!(trail.read_all().unwrap().is_empty());
    }

    #[test]
    fn disabled_trail_is_a_noop() {
        let trail = CurationTrail::disabled();
        assert!(!trail.is_enabled());
        trail.append(&event("ply-a")).unwrap();
        assert!(trail.read_all().unwrap().is_empty());
    }
}
