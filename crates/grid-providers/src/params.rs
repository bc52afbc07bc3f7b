//! Loader invocation parameters.
//!
//! Parameters travel as a flat string map. Each loader declares which option
//! names it accepts; anything else is rejected up front so typos fail loudly
//! instead of being silently ignored.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::error::ProviderError;

/// Recognized-option configuration passed to a loader invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject any option not in `accepted`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidParameter`] naming the first
    /// unrecognized option.
    pub fn ensure_recognized(
        &self,
        accepted: &[&str],
        loader: &str,
    ) -> Result<(), ProviderError> {
        for key in self.0.keys() {
            if !accepted.contains(&key.as_str()) {
                return Err(ProviderError::InvalidParameter {
                    loader: loader.to_string(),
                    name: key.clone(),
                    reason: format!("unrecognized option (accepted: {})", accepted.join(", ")),
                });
            }
        }
        Ok(())
    }

    /// Fetch a required option.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidParameter`] if the option is absent.
    pub fn require(&self, key: &str, loader: &str) -> Result<&str, ProviderError> {
        self.get(key).ok_or_else(|| ProviderError::InvalidParameter {
            loader: loader.to_string(),
            name: key.to_string(),
            reason: "required option is missing".to_string(),
        })
    }

    /// Fetch and parse a required integer option.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidParameter`] if the option is absent or
    /// not an integer.
    pub fn require_u16(&self, key: &str, loader: &str) -> Result<u16, ProviderError> {
        let raw = self.require(key, loader)?;
        raw.parse::<u16>()
            .map_err(|_| ProviderError::InvalidParameter {
                loader: loader.to_string(),
                name: key.to_string(),
                reason: format!("expected an integer, got '{raw}'"),
            })
    }

    /// Parse an optional integer option.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidParameter`] if present but not an
    /// integer.
    pub fn get_u16(&self, key: &str, loader: &str) -> Result<Option<u16>, ProviderError> {
        self.get(key)
            .map(|raw| {
                raw.parse::<u16>()
                    .map_err(|_| ProviderError::InvalidParameter {
                        loader: loader.to_string(),
                        name: key.to_string(),
                        reason: format!("expected an integer, got '{raw}'"),
                    })
            })
            .transpose()
    }
}

/// Parse a week window: either a single week (`"5"`) or an inclusive range
/// (`"1-4"`).
///
/// # Errors
///
/// Returns [`ProviderError::InvalidParameter`] on malformed or inverted
/// ranges.
pub fn parse_week_range(raw: &str, loader: &str) -> Result<RangeInclusive<u16>, ProviderError> {
    let invalid = |reason: String| ProviderError::InvalidParameter {
        loader: loader.to_string(),
        name: "weeks".to_string(),
        reason,
    };

    let parse_one = |s: &str| {
        s.trim()
            .parse::<u16>()
            .map_err(|_| invalid(format!("expected a week number, got '{s}'")))
    };

    match raw.split_once('-') {
        None => {
            let week = parse_one(raw)?;
            Ok(week..=week)
        }
        Some((lo, hi)) => {
            let lo = parse_one(lo)?;
            let hi = parse_one(hi)?;
            if lo > hi {
                return Err(invalid(format!("inverted range '{raw}'")));
            }
            Ok(lo..=hi)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn unrecognized_option_rejected() {
        let params = Params::new().set("season", "2024").set("weks", "1-4");
        let err = params
            .ensure_recognized(&["season", "weeks"], "providers/nflverse/weekly_stats")
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::InvalidParameter { ref name, .. } if name == "weks"
        ));
    }

    #[test]
    fn recognized_options_pass() {
        let params = Params::new().set("season", "2024");
        assert!(params.ensure_recognized(&["season", "weeks"], "l").is_ok());
        assert!(Params::new().ensure_recognized(&[], "l").is_ok());
    }

    #[test]
    fn require_missing_fails() {
        let err = Params::new().require("league_id", "l").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidParameter { .. }));
    }

    #[rstest]
    #[case("5", 5, 5)]
    #[case("1-4", 1, 4)]
    #[case("03-10", 3, 10)]
    #[case(" 2 - 6 ", 2, 6)]
    fn week_range_forms(#[case] raw: &str, #[case] lo: u16, #[case] hi: u16) {
        assert_eq!(parse_week_range(raw, "l").unwrap(), lo..=hi);
    }

    #[rstest]
    #[case("4-1")]
    #[case("a-b")]
    #[case("")]
    fn malformed_week_ranges_rejected(#[case] raw: &str) {
        assert!(parse_week_range(raw, "l").is_err());
    }

    #[test]
    fn get_u16_parses_or_fails() {
        let params = Params::new().set("season", "2024").set("bad", "20x4");
        assert_eq!(params.get_u16("season", "l").unwrap(), Some(2024));
        assert_eq!(params.get_u16("absent", "l").unwrap(), None);
        assert!(params.get_u16("bad", "l").is_err());
    }

    #[test]
    fn require_u16_missing_or_malformed() {
        let params = Params::new().set("season", "twenty24");
        assert!(params.require_u16("season", "l").is_err());
        assert!(params.require_u16("absent", "l").is_err());
        let ok = Params::new().set("season", "2024");
        assert_eq!(ok.require_u16("season", "l").unwrap(), 2024);
    }
}
