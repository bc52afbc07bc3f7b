//! # grid-core
//!
//! Core types shared across all Gridiron crates:
//! - Entity structs for snapshots, quality findings, run results, and
//!   canonical entities
//! - Status and severity enums with stable string representations
//! - Cross-cutting error types
//! - Curation trail envelope for JSONL persistence
//! - Tracing init helper for binaries and tests embedding the pipeline

pub mod entities;
pub mod enums;
pub mod errors;
pub mod logging;
pub mod trail;
