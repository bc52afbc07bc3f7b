//! Tracing subscriber setup for hosts embedding the pipeline.
//!
//! The pipeline crates only emit `tracing` events; installing a subscriber is
//! the host's job. This helper applies the conventional setup: `GRIDIRON_LOG`
//! env filter when set, a fixed default level otherwise.

use crate::errors::CoreError;

/// Install a global fmt subscriber filtered by `GRIDIRON_LOG` (falling back
/// to `default_level`, e.g. `"warn"` or `"gridiron=info"`).
///
/// # Errors
///
/// Returns [`CoreError`] if a global subscriber is already installed.
pub fn init_tracing(default_level: &str) -> Result<(), CoreError> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("GRIDIRON_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| {
            CoreError::Other(anyhow::anyhow!(
                "failed to initialize tracing subscriber: {error}"
            ))
        })
}
