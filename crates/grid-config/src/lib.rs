//! # grid-config
//!
//! Layered configuration loading for Gridiron using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`GRIDIRON_*` prefix, `__` as separator)
//! 2. Project-level `.gridiron/config.toml`
//! 3. User-level `~/.config/gridiron/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `GRIDIRON_RETRY__MAX_ATTEMPTS` -> `retry.max_attempts`,
//! `GRIDIRON_STORAGE__ROOT` -> `storage.root`, etc. The `__` (double
//! underscore) separates nested config sections.
//!
//! Every operational parameter of the pipeline — retry ceiling, backoff
//! delays, coverage threshold, strict-schema mode, provider timeouts and base
//! URLs, storage root — lives here so tests and deployments can inject their
//! own values instead of relying on hard-coded constants.

mod error;
mod providers;
mod quality;
mod retry;
mod storage;

pub use error::ConfigError;
pub use providers::{EndpointConfig, ProvidersConfig};
pub use quality::QualityConfig;
pub use retry::RetryConfig;
pub use storage::StorageConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GridConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl GridConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` — use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if figment extraction fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// Calls `dotenvy` to load the `.env` file from the workspace root before
    /// building the figment. This is the typical entry point for hosts and
    /// tests.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if figment extraction fails.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add additional
    /// providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".gridiron/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment = figment.merge(Env::prefixed("GRIDIRON_").split("__"));

        figment
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gridiron").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) or current dir
    /// looking for a `.env` file. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // Walk up at most 3 levels (crate -> crates/ -> workspace root)
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        // Fallback: try current directory
        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = GridConfig::default();
        assert_eq!(config.retry.max_attempts, 3);
        assert!((config.quality.key_coverage_threshold - 0.95).abs() < f64::EPSILON);
        assert!(!config.quality.strict_schema);
        assert_eq!(config.providers.timeout_secs, 10);
    }

    #[test]
    fn figment_builds_without_files() {
        let figment = GridConfig::figment();
        let config: GridConfig = figment.extract().expect("should extract defaults");
        assert_eq!(config.storage.root, ".gridiron/lake");
        assert_eq!(config.storage.staging_prefix, "_staging");
    }
}
