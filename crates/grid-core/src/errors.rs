//! Cross-cutting error types for Gridiron.
//!
//! Domain-specific errors (`RegistryError`, `ProviderError`, `LakeError`,
//! `CrosswalkError`, `PipelineError`) are defined in their respective crates;
//! this module only holds errors that can originate anywhere.

use thiserror::Error;

/// Errors that can be raised by any Gridiron crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Data failed validation (schema, format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
