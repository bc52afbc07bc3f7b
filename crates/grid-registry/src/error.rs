//! Registry error types.

use thiserror::Error;

/// Errors raised by contract registration and lookup.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A contract for this (provider, dataset) is already registered in this
    /// process lifetime.
    #[error("duplicate registration: {provider}/{dataset}")]
    DuplicateRegistration { provider: String, dataset: String },

    /// No contract registered for this (provider, dataset).
    #[error("unknown dataset: {provider}/{dataset}")]
    UnknownDataset { provider: String, dataset: String },

    /// A contract is internally inconsistent (e.g. a primary-key column not
    /// present in the schema).
    #[error("invalid contract for {provider}/{dataset}: {reason}")]
    InvalidContract {
        provider: String,
        dataset: String,
        reason: String,
    },
}
