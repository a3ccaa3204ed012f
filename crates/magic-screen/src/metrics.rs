//! Earnings yield and return on capital.
//!
//! Both metrics are percentages rounded to two decimals. A non-positive
//! denominator yields `0.0`, which the screener then treats as unattractive.

use crate::error::ScreenError;
use magic_data::RawFinancials;
use serde::{Deserialize, Serialize};

/// Round to two decimals, halves to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Raw financials plus the derived Magic Formula metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Source record
    #[serde(flatten)]
    pub financials: RawFinancials,
    /// EBIT / enterprise value, in percent
    pub earnings_yield: f64,
    /// EBIT / (net working capital + net fixed assets), in percent
    pub return_on_capital: f64,
    /// Current assets minus current liabilities
    pub net_working_capital: f64,
    /// Total assets minus current assets, intangibles and goodwill
    pub net_fixed_assets: f64,
}

impl DerivedMetrics {
    /// Ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.financials.symbol
    }

    /// Net working capital plus net fixed assets.
    pub fn capital_employed(&self) -> f64 {
        self.net_working_capital + self.net_fixed_assets
    }

    /// Whether both metrics are strictly positive.
    pub fn is_attractive(&self) -> bool {
        self.earnings_yield > 0.0 && self.return_on_capital > 0.0
    }
}

/// Compute earnings yield and return on capital for one company.
///
/// EBIT, enterprise value, total assets, current assets and current
/// liabilities are required. Intangibles and goodwill default to zero when
/// the provider did not report them.
///
/// # Errors
///
/// Returns [`ScreenError::MissingField`] for the first required attribute
/// that is absent or not finite.
pub fn compute_metrics(raw: &RawFinancials) -> Result<DerivedMetrics, ScreenError> {
    let symbol = raw.symbol.as_str();
    let ebit = required(symbol, "ebit", raw.ebit)?;
    let enterprise_value = required(symbol, "enterprise_value", raw.enterprise_value)?;
    let total_assets = required(symbol, "total_assets", raw.total_assets)?;
    let current_assets = required(symbol, "total_current_assets", raw.total_current_assets)?;
    let current_liabilities = required(
        symbol,
        "total_current_liabilities",
        raw.total_current_liabilities,
    )?;
    let intangibles = optional(symbol, "intangible_assets", raw.intangible_assets)?;
    let goodwill = optional(symbol, "goodwill", raw.goodwill)?;

    let net_working_capital = current_assets - current_liabilities;
    let net_fixed_assets = total_assets - current_assets - intangibles - goodwill;

    Ok(DerivedMetrics {
        financials: raw.clone(),
        earnings_yield: earnings_yield(ebit, enterprise_value),
        return_on_capital: return_on_capital(ebit, net_working_capital + net_fixed_assets),
        net_working_capital,
        net_fixed_assets,
    })
}

/// EBIT / EV × 100, or `0.0` when EV is not positive.
pub fn earnings_yield(ebit: f64, enterprise_value: f64) -> f64 {
    if enterprise_value > 0.0 {
        round2(ebit / enterprise_value * 100.0)
    } else {
        0.0
    }
}

/// EBIT / capital employed × 100, or `0.0` when capital employed is not positive.
pub fn return_on_capital(ebit: f64, capital_employed: f64) -> f64 {
    if capital_employed > 0.0 {
        round2(ebit / capital_employed * 100.0)
    } else {
        0.0
    }
}

fn required(symbol: &str, field: &'static str, value: Option<f64>) -> Result<f64, ScreenError> {
    value
        .filter(|v| v.is_finite())
        .ok_or_else(|| ScreenError::MissingField {
            symbol: symbol.to_string(),
            field,
        })
}

fn optional(symbol: &str, field: &'static str, value: Option<f64>) -> Result<f64, ScreenError> {
    match value {
        None => Ok(0.0),
        Some(v) => required(symbol, field, Some(v)),
    }
}
