//! Response types for the Financial Modeling Prep API.
//!
//! Numeric fields are optional because FMP returns `null` or omits lines a
//! company does not report.

use crate::error::{DataError, Result};
use crate::types::{PricePoint, RawFinancials};
use chrono::NaiveDate;
use serde::Deserialize;

/// Income statement (latest period only is requested).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    /// Period end date.
    #[serde(default)]
    pub date: String,
    /// Operating income.
    pub operating_income: Option<f64>,
}

/// Balance sheet statement.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    /// Period end date.
    #[serde(default)]
    pub date: String,
    /// Total assets.
    pub total_assets: Option<f64>,
    /// Total current assets.
    pub total_current_assets: Option<f64>,
    /// Total current liabilities.
    pub total_current_liabilities: Option<f64>,
    /// Intangible assets.
    pub intangible_assets: Option<f64>,
    /// Goodwill.
    pub goodwill: Option<f64>,
}

/// Key metrics.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    /// Period end date.
    #[serde(default)]
    pub date: String,
    /// Enterprise value.
    pub enterprise_value: Option<f64>,
    /// Market capitalization at period end.
    pub market_cap: Option<f64>,
}

/// Company profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    /// Ticker symbol.
    #[serde(default)]
    pub symbol: String,
    /// Company name.
    pub company_name: Option<String>,
    /// Sector.
    pub sector: Option<String>,
    /// Current market capitalization.
    pub mkt_cap: Option<f64>,
}

/// Index constituent entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Constituent {
    /// Ticker symbol.
    pub symbol: String,
}

/// Entry of the tradable-symbols list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradableSymbol {
    /// Ticker symbol.
    pub symbol: String,
    /// Instrument type ("stock", "etf", "trust", ...).
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl TradableSymbol {
    /// Whether the instrument is a common stock.
    pub fn is_stock(&self) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|k| k.eq_ignore_ascii_case("stock"))
    }
}

/// A daily bar from the historical price endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalPrice {
    /// Date (YYYY-MM-DD).
    pub date: String,
    /// Close price.
    pub close: Option<f64>,
}

/// Wrapper for the historical price response.
///
/// FMP answers `{}` for symbols without history, hence the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoricalPriceResponse {
    /// Symbol.
    #[serde(default)]
    pub symbol: String,
    /// Daily bars, most recent first.
    #[serde(default)]
    pub historical: Vec<HistoricalPrice>,
}

impl HistoricalPriceResponse {
    /// Convert to price points, skipping rows without a usable date or close.
    pub fn into_price_points(self) -> Vec<PricePoint> {
        self.historical
            .into_iter()
            .filter_map(|bar| {
                let date = NaiveDate::parse_from_str(&bar.date, "%Y-%m-%d").ok()?;
                let close = bar.close.filter(|c| c.is_finite())?;
                Some(PricePoint::new(date, close))
            })
            .collect()
    }
}

/// Merge the four statement responses into one record.
///
/// The profile is mandatory: without it the symbol is unknown to FMP.
/// Market cap prefers the live profile value over the period-end metric.
pub fn merge_financials(
    symbol: &str,
    income: Option<&IncomeStatement>,
    balance: Option<&BalanceSheet>,
    metrics: Option<&KeyMetrics>,
    profile: Option<&CompanyProfile>,
) -> Result<RawFinancials> {
    let profile = profile.ok_or_else(|| DataError::NotFound(symbol.to_string()))?;

    let mut raw = RawFinancials::new(symbol);
    raw.name = profile.company_name.clone().unwrap_or_default();
    raw.sector = profile.sector.clone().unwrap_or_default();
    raw.market_cap = profile.mkt_cap.or_else(|| metrics.and_then(|m| m.market_cap));
    raw.ebit = income.and_then(|i| i.operating_income);
    raw.enterprise_value = metrics.and_then(|m| m.enterprise_value);

    if let Some(balance) = balance {
        raw.total_assets = balance.total_assets;
        raw.total_current_assets = balance.total_current_assets;
        raw.total_current_liabilities = balance.total_current_liabilities;
        raw.intangible_assets = balance.intangible_assets;
        raw.goodwill = balance.goodwill;
    }

    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE_JSON: &str = r#"[{
        "symbol": "AAPL",
        "companyName": "Apple Inc.",
        "sector": "Technology",
        "mktCap": 3000000000000,
        "price": 190.5
    }]"#;

    const BALANCE_JSON: &str = r#"[{
        "date": "2023-09-30",
        "symbol": "AAPL",
        "totalAssets": 352583000000,
        "totalCurrentAssets": 143566000000,
        "totalCurrentLiabilities": 145308000000,
        "intangibleAssets": null,
        "goodwill": 0
    }]"#;

    #[test]
    fn test_merge_financials() {
        let profile: Vec<CompanyProfile> = serde_json::from_str(PROFILE_JSON).unwrap();
        let balance: Vec<BalanceSheet> = serde_json::from_str(BALANCE_JSON).unwrap();
        let income = IncomeStatement {
            date: "2023-09-30".to_string(),
            operating_income: Some(114_301_000_000.0),
        };
        let metrics = KeyMetrics {
            date: "2023-09-30".to_string(),
            enterprise_value: Some(2_900_000_000_000.0),
            market_cap: Some(2_800_000_000_000.0),
        };

        let raw = merge_financials(
            "AAPL",
            Some(&income),
            balance.first(),
            Some(&metrics),
            profile.first(),
        )
        .unwrap();

        assert_eq!(raw.name, "Apple Inc.");
        assert_eq!(raw.sector, "Technology");
        assert_eq!(raw.market_cap, Some(3_000_000_000_000.0));
        assert_eq!(raw.ebit, Some(114_301_000_000.0));
        assert_eq!(raw.enterprise_value, Some(2_900_000_000_000.0));
        assert_eq!(raw.total_assets, Some(352_583_000_000.0));
        assert_eq!(raw.intangible_assets, None);
        assert_eq!(raw.goodwill, Some(0.0));
    }

    #[test]
    fn test_merge_without_profile_is_not_found() {
        let result = merge_financials("ZZZZ", None, None, None, None);
        assert!(matches!(result, Err(DataError::NotFound(s)) if s == "ZZZZ"));
    }

    #[test]
    fn test_merge_market_cap_fallback() {
        let profile = CompanyProfile {
            symbol: "X".to_string(),
            ..Default::default()
        };
        let metrics = KeyMetrics {
            market_cap: Some(42.0),
            ..Default::default()
        };

        let raw = merge_financials("X", None, None, Some(&metrics), Some(&profile)).unwrap();
        assert_eq!(raw.market_cap, Some(42.0));
        assert!(raw.ebit.is_none());
        assert!(raw.total_assets.is_none());
    }

    #[test]
    fn test_historical_response_parsing() {
        let json = r#"{
            "symbol": "AAPL",
            "historical": [
                {"date": "2024-01-03", "close": 184.25, "open": 184.2},
                {"date": "2024-01-02", "close": 185.64},
                {"date": "not-a-date", "close": 1.0},
                {"date": "2023-12-29", "close": null}
            ]
        }"#;

        let response: HistoricalPriceResponse = serde_json::from_str(json).unwrap();
        let points = response.into_price_points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].close, 184.25);
    }

    #[test]
    fn test_empty_historical_response() {
        let response: HistoricalPriceResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_price_points().is_empty());
    }

    #[test]
    fn test_tradable_symbol_kind() {
        let json = r#"[
            {"symbol": "AAPL", "type": "stock"},
            {"symbol": "SPY", "type": "etf"},
            {"symbol": "XYZ"}
        ]"#;
        let list: Vec<TradableSymbol> = serde_json::from_str(json).unwrap();
        let stocks: Vec<_> = list.iter().filter(|s| s.is_stock()).collect();
        assert_eq!(stocks.len(), 1);
        assert_eq!(stocks[0].symbol, "AAPL");
    }
}
