//! Provider client configuration.
//!
//! Base URLs are configurable per provider so tests and mirrors can point
//! loaders somewhere else without code changes; defaults are the real
//! upstream endpoints.

use serde::{Deserialize, Serialize};

const fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    String::from("gridiron/0.1")
}

fn default_nflverse_base() -> String {
    String::from("https://github.com/nflverse/nflverse-data/releases/download")
}

fn default_sleeper_base() -> String {
    String::from("https://api.sleeper.app/v1")
}

fn default_ktc_base() -> String {
    String::from("https://keeptradecut.com/dynasty-rankings")
}

fn default_sheets_base() -> String {
    String::from("https://docs.google.com/spreadsheets/d")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    /// Per-request timeout applied to every provider fetch.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub nflverse: EndpointConfig,
    #[serde(default)]
    pub sleeper: EndpointConfig,
    #[serde(default)]
    pub ktc: EndpointConfig,
    #[serde(default)]
    pub sheets: EndpointConfig,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            nflverse: EndpointConfig::default(),
            sleeper: EndpointConfig::default(),
            ktc: EndpointConfig::default(),
            sheets: EndpointConfig::default(),
        }
    }
}

impl ProvidersConfig {
    /// Effective nflverse release-artifact base URL.
    #[must_use]
    pub fn nflverse_base(&self) -> String {
        if self.nflverse.base_url.is_empty() {
            default_nflverse_base()
        } else {
            self.nflverse.base_url.clone()
        }
    }

    /// Effective Sleeper REST base URL.
    #[must_use]
    pub fn sleeper_base(&self) -> String {
        if self.sleeper.base_url.is_empty() {
            default_sleeper_base()
        } else {
            self.sleeper.base_url.clone()
        }
    }

    /// Effective KeepTradeCut feed base URL.
    #[must_use]
    pub fn ktc_base(&self) -> String {
        if self.ktc.base_url.is_empty() {
            default_ktc_base()
        } else {
            self.ktc.base_url.clone()
        }
    }

    /// Effective Google Sheets export base URL.
    #[must_use]
    pub fn sheets_base(&self) -> String {
        if self.sheets.base_url.is_empty() {
            default_sheets_base()
        } else {
            self.sheets.base_url.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_real_upstreams() {
        let config = ProvidersConfig::default();
        assert!(config.sleeper_base().starts_with("https://api.sleeper.app"));
        assert!(config.nflverse_base().contains("nflverse-data"));
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn base_url_override_wins() {
        let config = ProvidersConfig {
            sleeper: EndpointConfig {
                base_url: "http://localhost:8080/v1".into(),
            },
            ..Default::default()
        };
        assert_eq!(config.sleeper_base(), "http://localhost:8080/v1");
    }
}
