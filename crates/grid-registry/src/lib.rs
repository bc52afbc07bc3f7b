//! # grid-registry
//!
//! The single authoritative declaration of what datasets exist, how to fetch
//! them, and what correctness means for each.
//!
//! A [`DatasetContract`] binds one (provider, dataset) pair to its declared
//! column schema, primary-key set, producing loader, and (optionally) the
//! column carrying a provider-native entity identifier. The [`Registry`] is
//! built once at process start — [`Registry::with_builtin`] registers every
//! known contract — and is read-only for the rest of the process lifetime:
//! share it by reference, no locking required.

mod builtin;
mod contract;
mod error;
mod registry;

pub use contract::{ColumnSpec, DatasetContract, EntityRef};
pub use error::RegistryError;
pub use registry::Registry;
