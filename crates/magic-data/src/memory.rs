//! In-memory snapshot provider.

use crate::error::{DataError, Result};
use crate::provider::DataProvider;
use crate::types::{PricePoint, RawFinancials, sort_most_recent_first};
use crate::universe::UniverseSelector;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// A provider serving a fixed snapshot of data.
///
/// Symbols without financials fail with [`DataError::NotFound`]; symbols
/// without a price history return an empty series.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    universes: HashMap<UniverseSelector, Vec<String>>,
    financials: HashMap<String, RawFinancials>,
    prices: HashMap<String, Vec<PricePoint>>,
    failing: HashSet<String>,
    failing_prices: HashSet<String>,
}

impl InMemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the symbol list returned for a universe.
    pub fn with_universe(mut self, universe: UniverseSelector, symbols: Vec<String>) -> Self {
        self.universes.insert(universe, symbols);
        self
    }

    /// Add financials for a symbol.
    pub fn with_financials(mut self, financials: RawFinancials) -> Self {
        self.financials
            .insert(financials.symbol.clone(), financials);
        self
    }

    /// Add a price history for a symbol (any order).
    pub fn with_prices(mut self, symbol: impl Into<String>, mut prices: Vec<PricePoint>) -> Self {
        sort_most_recent_first(&mut prices);
        self.prices.insert(symbol.into(), prices);
        self
    }

    /// Make every fetch for a symbol fail with a network-style error.
    pub fn with_failure(mut self, symbol: impl Into<String>) -> Self {
        self.failing.insert(symbol.into());
        self
    }

    /// Make only the price history fetch for a symbol fail.
    pub fn with_price_failure(mut self, symbol: impl Into<String>) -> Self {
        self.failing_prices.insert(symbol.into());
        self
    }

    /// Number of symbols with financials.
    pub fn len(&self) -> usize {
        self.financials.len()
    }

    /// Whether the snapshot holds no financials.
    pub fn is_empty(&self) -> bool {
        self.financials.is_empty()
    }
}

#[async_trait]
impl DataProvider for InMemoryProvider {
    async fn list_symbols(&self, universe: UniverseSelector) -> Result<Vec<String>> {
        Ok(self.universes.get(&universe).cloned().unwrap_or_default())
    }

    async fn fetch_financials(&self, symbol: &str) -> Result<RawFinancials> {
        if self.failing.contains(symbol) {
            return Err(DataError::Api {
                status: 503,
                message: format!("simulated failure for {symbol}"),
            });
        }

        self.financials
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::NotFound(symbol.to_string()))
    }

    async fn fetch_price_history(
        &self,
        symbol: &str,
        trading_days: usize,
    ) -> Result<Vec<PricePoint>> {
        if self.failing.contains(symbol) || self.failing_prices.contains(symbol) {
            return Err(DataError::Api {
                status: 503,
                message: format!("simulated failure for {symbol}"),
            });
        }

        Ok(self
            .prices
            .get(symbol)
            .map(|p| p.iter().take(trading_days + 1).copied().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_unknown_symbol_not_found() {
        let provider = InMemoryProvider::new();
        let result = provider.fetch_financials("NOPE").await;
        assert!(matches!(result, Err(DataError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failing_symbol() {
        let provider = InMemoryProvider::new()
            .with_financials(RawFinancials::new("AAPL"))
            .with_failure("AAPL");
        assert!(provider.fetch_financials("AAPL").await.is_err());
        assert!(provider.fetch_price_history("AAPL", 5).await.is_err());
    }

    #[tokio::test]
    async fn test_price_only_failure() {
        let provider = InMemoryProvider::new()
            .with_financials(RawFinancials::new("AAPL"))
            .with_price_failure("AAPL");
        assert!(provider.fetch_financials("AAPL").await.is_ok());
        assert!(matches!(
            provider.fetch_price_history("AAPL", 5).await,
            Err(DataError::Api { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_price_history_truncated_and_sorted() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        let provider = InMemoryProvider::new().with_prices(
            "AAPL",
            vec![
                PricePoint::new(d(1), 1.0),
                PricePoint::new(d(3), 3.0),
                PricePoint::new(d(2), 2.0),
                PricePoint::new(d(4), 4.0),
            ],
        );

        let prices = provider.fetch_price_history("AAPL", 1).await.unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].date, d(4));
        assert_eq!(prices[1].date, d(3));
    }

    #[tokio::test]
    async fn test_universe_listing() {
        let provider = InMemoryProvider::new().with_universe(
            UniverseSelector::LargeCap,
            vec!["AAPL".to_string(), "MSFT".to_string()],
        );

        assert_eq!(
            provider
                .list_symbols(UniverseSelector::LargeCap)
                .await
                .unwrap()
                .len(),
            2
        );
        assert!(
            provider
                .list_symbols(UniverseSelector::AllTradable)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
