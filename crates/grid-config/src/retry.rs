//! Fetch retry and backoff configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const fn default_max_attempts() -> u32 {
    3
}

const fn default_base_delay_ms() -> u64 {
    500
}

const fn default_max_delay_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Total attempt ceiling per fetch, including the first try.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before the second attempt; doubles per subsequent attempt.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound on any single backoff delay.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryConfig {
    /// Backoff delay before retrying after `completed_attempts` failures:
    /// `base * 2^(completed_attempts - 1)`, capped at `max_delay_ms`.
    #[must_use]
    pub fn delay_after(&self, completed_attempts: u32) -> Duration {
        let exp = completed_attempts.saturating_sub(1).min(16);
        let delay = self
            .base_delay_ms
            .saturating_mul(1u64 << exp)
            .min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let config = RetryConfig {
            max_attempts: 5,
            base_delay_ms: 500,
            max_delay_ms: 1500,
        };
        assert_eq!(config.delay_after(1), Duration::from_millis(500));
        assert_eq!(config.delay_after(2), Duration::from_millis(1000));
        assert_eq!(config.delay_after(3), Duration::from_millis(1500));
        assert_eq!(config.delay_after(10), Duration::from_millis(1500));
    }

    #[test]
    fn large_attempt_counts_do_not_overflow() {
        let config = RetryConfig::default();
        assert_eq!(
            config.delay_after(u32::MAX),
            Duration::from_millis(config.max_delay_ms)
        );
    }
}
