//! The data provider boundary used by the screener.

use crate::error::Result;
use crate::types::{PricePoint, RawFinancials};
use crate::universe::UniverseSelector;
use async_trait::async_trait;
use std::sync::Arc;

/// Source of symbols, fundamentals and price histories.
///
/// Implementations own their transport concerns (authentication, rate
/// limiting, timeouts). Every method is independent per symbol.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// List the symbols of a universe in provider order.
    async fn list_symbols(&self, universe: UniverseSelector) -> Result<Vec<String>>;

    /// Fetch the latest financial facts for a symbol.
    async fn fetch_financials(&self, symbol: &str) -> Result<RawFinancials>;

    /// Fetch daily closes covering at least `trading_days` sessions back,
    /// ordered most-recent-first.
    async fn fetch_price_history(
        &self,
        symbol: &str,
        trading_days: usize,
    ) -> Result<Vec<PricePoint>>;
}

#[async_trait]
impl<P: DataProvider + ?Sized> DataProvider for Arc<P> {
    async fn list_symbols(&self, universe: UniverseSelector) -> Result<Vec<String>> {
        (**self).list_symbols(universe).await
    }

    async fn fetch_financials(&self, symbol: &str) -> Result<RawFinancials> {
        (**self).fetch_financials(symbol).await
    }

    async fn fetch_price_history(
        &self,
        symbol: &str,
        trading_days: usize,
    ) -> Result<Vec<PricePoint>> {
        (**self).fetch_price_history(symbol, trading_days).await
    }
}

#[async_trait]
impl<P: DataProvider + ?Sized> DataProvider for Box<P> {
    async fn list_symbols(&self, universe: UniverseSelector) -> Result<Vec<String>> {
        (**self).list_symbols(universe).await
    }

    async fn fetch_financials(&self, symbol: &str) -> Result<RawFinancials> {
        (**self).fetch_financials(symbol).await
    }

    async fn fetch_price_history(
        &self,
        symbol: &str,
        trading_days: usize,
    ) -> Result<Vec<PricePoint>> {
        (**self).fetch_price_history(symbol, trading_days).await
    }
}
