//! Trailing price returns.
//!
//! Offsets are counted in observations on a most-recent-first series, so
//! `prices[0]` is the latest close and `prices[21]` is roughly one month back.

use crate::metrics::round2;
use magic_data::PricePoint;
use serde::{Deserialize, Serialize};

/// Lookback horizons reported for every candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnHorizon {
    /// One trading day
    OneDay,
    /// About one month (21 trading days)
    OneMonth,
    /// About one year (252 trading days)
    OneYear,
}

impl ReturnHorizon {
    /// All horizons, shortest first.
    pub const fn all() -> [Self; 3] {
        [Self::OneDay, Self::OneMonth, Self::OneYear]
    }

    /// Number of observations between the latest close and the base close.
    pub const fn offset(self) -> usize {
        match self {
            Self::OneDay => 1,
            Self::OneMonth => 21,
            Self::OneYear => 252,
        }
    }
}

/// Trailing returns in percent; `None` when the history is too short.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnMetrics {
    /// One-day return
    pub return_1d: Option<f64>,
    /// One-month return
    pub return_1m: Option<f64>,
    /// One-year return
    pub return_1y: Option<f64>,
}

impl ReturnMetrics {
    /// Return for a given horizon.
    pub const fn get(&self, horizon: ReturnHorizon) -> Option<f64> {
        match horizon {
            ReturnHorizon::OneDay => self.return_1d,
            ReturnHorizon::OneMonth => self.return_1m,
            ReturnHorizon::OneYear => self.return_1y,
        }
    }
}

/// Percentage change from `prices[offset]` to `prices[0]`, rounded to two decimals.
///
/// Returns `None` if the series has fewer than `offset + 1` points or if the
/// base close is zero or not finite.
pub fn trailing_return(prices: &[PricePoint], offset: usize) -> Option<f64> {
    let latest = prices.first()?.close;
    let base = prices.get(offset)?.close;

    if base == 0.0 || !base.is_finite() || !latest.is_finite() {
        return None;
    }

    Some(round2((latest - base) / base * 100.0))
}

/// Compute all trailing returns from a most-recent-first series.
pub fn compute_returns(prices: &[PricePoint]) -> ReturnMetrics {
    ReturnMetrics {
        return_1d: trailing_return(prices, ReturnHorizon::OneDay.offset()),
        return_1m: trailing_return(prices, ReturnHorizon::OneMonth.offset()),
        return_1y: trailing_return(prices, ReturnHorizon::OneYear.offset()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Days, NaiveDate};

    /// Build a most-recent-first series from closes listed newest first.
    fn series(closes: &[f64]) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint::new(start - Days::new(i as u64), close))
            .collect()
    }

    #[test]
    fn test_one_day_return() {
        let prices = series(&[110.0, 100.0]);
        assert_relative_eq!(trailing_return(&prices, 1).unwrap(), 10.0);
    }

    #[test]
    fn test_history_too_short() {
        let prices = series(&[110.0, 100.0]);
        assert!(trailing_return(&prices, 21).is_none());
        assert!(trailing_return(&[], 1).is_none());
    }

    #[test]
    fn test_zero_base_price() {
        let prices = series(&[110.0, 0.0]);
        assert!(trailing_return(&prices, 1).is_none());
    }

    #[test]
    fn test_full_year_series() {
        let mut closes = vec![100.0; 253];
        closes[0] = 120.0;
        closes[21] = 96.0;
        closes[252] = 80.0;

        let returns = compute_returns(&series(&closes));
        assert_relative_eq!(returns.return_1d.unwrap(), 20.0);
        assert_relative_eq!(returns.return_1m.unwrap(), 25.0);
        assert_relative_eq!(returns.return_1y.unwrap(), 50.0);
        assert_eq!(returns.get(ReturnHorizon::OneYear), returns.return_1y);
    }

    #[test]
    fn test_partial_series() {
        let returns = compute_returns(&series(&[99.0; 30]));
        assert_eq!(returns.return_1d, Some(0.0));
        assert_eq!(returns.return_1m, Some(0.0));
        assert!(returns.return_1y.is_none());
    }

    #[test]
    fn test_negative_return_rounding() {
        let prices = series(&[2.0, 3.0]);
        assert_relative_eq!(trailing_return(&prices, 1).unwrap(), -33.33);
    }

    #[test]
    fn test_horizon_offsets() {
        let offsets: Vec<_> = ReturnHorizon::all().iter().map(|h| h.offset()).collect();
        assert_eq!(offsets, vec![1, 21, 252]);
    }
}
