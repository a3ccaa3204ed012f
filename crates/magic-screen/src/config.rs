//! Screening parameters.

use crate::error::ScreenError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default minimum market capitalization (50 million).
pub const DEFAULT_MIN_MARKET_CAP: f64 = 50_000_000.0;

/// Default number of ranked results.
pub const DEFAULT_MAX_RESULTS: usize = 30;

/// Configuration for a [`Screener`](crate::Screener).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Companies below this market cap are skipped
    pub min_market_cap: f64,
    /// Truncate the ranked list to this many entries (`None` keeps all)
    pub max_results: Option<usize>,
    /// Stop scanning once `max_results × multiplier` candidates are accepted.
    /// Zero scans the whole universe.
    pub early_exit_multiplier: usize,
    /// Pause after every `pace_every` symbols (zero disables pacing)
    pub pace_every: usize,
    /// Length of each pause
    pub pace_delay: Duration,
    /// Trading days of price history requested per symbol
    pub price_lookback_days: usize,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            min_market_cap: DEFAULT_MIN_MARKET_CAP,
            max_results: Some(DEFAULT_MAX_RESULTS),
            early_exit_multiplier: 3,
            pace_every: 10,
            pace_delay: Duration::from_secs(1),
            price_lookback_days: 252,
        }
    }
}

impl ScreenConfig {
    /// Set the market cap floor.
    pub const fn with_min_market_cap(mut self, min_market_cap: f64) -> Self {
        self.min_market_cap = min_market_cap;
        self
    }

    /// Set the result limit.
    pub const fn with_max_results(mut self, max_results: Option<usize>) -> Self {
        self.max_results = max_results;
        self
    }

    /// Scan every symbol instead of stopping early.
    pub const fn full_scan(mut self) -> Self {
        self.early_exit_multiplier = 0;
        self
    }

    /// Disable pacing between symbols.
    pub const fn without_pacing(mut self) -> Self {
        self.pace_every = 0;
        self.pace_delay = Duration::ZERO;
        self
    }

    /// Candidate count at which scanning stops, if early exit applies.
    pub const fn early_exit_threshold(&self, max_results: Option<usize>) -> Option<usize> {
        match max_results {
            Some(n) if self.early_exit_multiplier > 0 => {
                Some(n.saturating_mul(self.early_exit_multiplier))
            }
            _ => None,
        }
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::InvalidConfig`] for a negative or non-finite
    /// market cap floor, or a zero result limit.
    pub fn validate(&self) -> Result<(), ScreenError> {
        Self::validate_limits(self.min_market_cap, self.max_results)
    }

    /// Check a market cap floor and result limit.
    ///
    /// # Errors
    ///
    /// Same conditions as [`validate`](Self::validate).
    pub fn validate_limits(
        min_market_cap: f64,
        max_results: Option<usize>,
    ) -> Result<(), ScreenError> {
        if !min_market_cap.is_finite() || min_market_cap < 0.0 {
            return Err(ScreenError::InvalidConfig(format!(
                "min_market_cap must be a non-negative number, got {min_market_cap}"
            )));
        }
        if max_results == Some(0) {
            return Err(ScreenError::InvalidConfig(
                "max_results must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScreenConfig::default();
        assert_eq!(config.min_market_cap, 50_000_000.0);
        assert_eq!(config.max_results, Some(30));
        assert_eq!(config.early_exit_threshold(config.max_results), Some(90));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_scan_has_no_threshold() {
        let config = ScreenConfig::default().full_scan();
        assert_eq!(config.early_exit_threshold(Some(30)), None);
        assert_eq!(ScreenConfig::default().early_exit_threshold(None), None);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(
            ScreenConfig::default()
                .with_min_market_cap(f64::NAN)
                .validate()
                .is_err()
        );
        assert!(
            ScreenConfig::default()
                .with_min_market_cap(-1.0)
                .validate()
                .is_err()
        );
        assert!(
            ScreenConfig::default()
                .with_max_results(Some(0))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_config_json() {
        let config = ScreenConfig::default().without_pacing();
        let json = serde_json::to_string(&config).unwrap();
        let back: ScreenConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
