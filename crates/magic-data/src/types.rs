//! Raw records supplied by data providers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-symbol financial facts as reported by a provider.
///
/// Numeric attributes are `None` when the provider response did not carry
/// them. Nothing is zero-filled here; deciding whether an absent value is
/// fatal belongs to the metric calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFinancials {
    /// Ticker symbol (unique key)
    pub symbol: String,
    /// Company name
    pub name: String,
    /// Sector classification
    pub sector: String,
    /// Market capitalization
    pub market_cap: Option<f64>,
    /// Operating income, used as the EBIT approximation
    pub ebit: Option<f64>,
    /// Enterprise value
    pub enterprise_value: Option<f64>,
    /// Total assets
    pub total_assets: Option<f64>,
    /// Total current assets
    pub total_current_assets: Option<f64>,
    /// Total current liabilities
    pub total_current_liabilities: Option<f64>,
    /// Intangible assets (excluding goodwill)
    pub intangible_assets: Option<f64>,
    /// Goodwill
    pub goodwill: Option<f64>,
}

impl RawFinancials {
    /// Create an empty record for a symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: String::new(),
            sector: String::new(),
            market_cap: None,
            ebit: None,
            enterprise_value: None,
            total_assets: None,
            total_current_assets: None,
            total_current_liabilities: None,
            intangible_assets: None,
            goodwill: None,
        }
    }
}

/// A single daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date
    pub date: NaiveDate,
    /// Closing price
    pub close: f64,
}

impl PricePoint {
    /// Create a new price point.
    pub const fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Sort a price history most-recent-first, dropping duplicate dates.
pub fn sort_most_recent_first(prices: &mut Vec<PricePoint>) {
    prices.sort_by(|a, b| b.date.cmp(&a.date));
    prices.dedup_by_key(|p| p.date);
}
