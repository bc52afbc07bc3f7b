//! Crosswalk error types.

use thiserror::Error;

/// Errors raised by resolution reads and curation writes.
#[derive(Debug, Error)]
pub enum CrosswalkError {
    /// An alias proposal would remap an already-mapped native id to a
    /// different canonical entity. Requires explicit human override.
    #[error(
        "crosswalk conflict: {provider}:{native_id} already maps to {existing}, proposed {proposed}"
    )]
    Conflict {
        provider: String,
        native_id: String,
        existing: String,
        proposed: String,
    },

    /// An alias proposal references a canonical id that does not exist.
    /// Resolution never invents identities; neither does curation.
    #[error("unknown canonical id: {0}")]
    UnknownCanonical(String),

    /// An entity with this canonical id already exists.
    #[error("duplicate canonical id: {0}")]
    DuplicateCanonical(String),

    /// Trail file I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A trail record could not be interpreted during replay.
    #[error("trail replay error: {0}")]
    Replay(String),
}
