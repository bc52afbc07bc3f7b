//! # grid-pipeline
//!
//! The quality gate and batch run orchestration for Gridiron.
//!
//! The [`DatasetRunner`] wires the registry, loaders, crosswalk, and
//! snapshot store into the per-dataset entry point external scheduling
//! infrastructure triggers: `run(provider, dataset, as_of, params)` returns
//! a [`RunResult`] with status `published`, `published_with_warnings`,
//! `lkg_fallback`, or `failed`. `run_all` fans out every registered dataset
//! concurrently with per-dataset failure isolation.
//!
//! [`RunResult`]: grid_core::entities::RunResult

mod error;
mod quality;
mod runner;

pub use error::PipelineError;
pub use quality::QualityGate;
pub use runner::DatasetRunner;
