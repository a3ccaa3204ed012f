//! Read-through caching wrapper around any [`DataProvider`].

use super::sqlite::SqliteCache;
use crate::error::{DataError, Result};
use crate::provider::DataProvider;
use crate::types::{PricePoint, RawFinancials};
use crate::universe::UniverseSelector;
use async_trait::async_trait;
use chrono::Duration;
use std::sync::{Mutex, MutexGuard};

/// Default freshness window for cached entries.
pub const DEFAULT_MAX_AGE_HOURS: i64 = 24;

/// Caching behaviour for [`CachedProvider`].
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// Entries older than this are refetched.
    pub max_age: Duration,
    /// Ignore cached entries (still writes fresh results).
    pub force_refresh: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::hours(DEFAULT_MAX_AGE_HOURS),
            force_refresh: false,
        }
    }
}

/// A provider that serves from a SQLite cache and falls back to `inner`.
///
/// Cache failures never fail a fetch: they are logged and the inner
/// provider is used.
#[derive(Debug)]
pub struct CachedProvider<P> {
    inner: P,
    cache: Mutex<SqliteCache>,
    policy: CachePolicy,
}

impl<P: DataProvider> CachedProvider<P> {
    /// Wrap a provider with a cache.
    pub const fn new(inner: P, cache: SqliteCache, policy: CachePolicy) -> Self {
        Self {
            inner,
            cache: Mutex::new(cache),
            policy,
        }
    }

    /// The wrapped provider.
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    fn lock(&self) -> Result<MutexGuard<'_, SqliteCache>> {
        self.cache
            .lock()
            .map_err(|_| DataError::Cache("cache lock poisoned".to_string()))
    }

    fn cached_financials(&self, symbol: &str) -> Option<RawFinancials> {
        if self.policy.force_refresh {
            return None;
        }

        match self
            .lock()
            .and_then(|cache| cache.get_financials(symbol, self.policy.max_age))
        {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(symbol, error = %e, "financials cache read failed");
                None
            }
        }
    }

    fn cached_prices(&self, symbol: &str, trading_days: usize) -> Option<Vec<PricePoint>> {
        if self.policy.force_refresh {
            return None;
        }

        match self
            .lock()
            .and_then(|cache| cache.get_prices(symbol, trading_days, self.policy.max_age))
        {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(symbol, error = %e, "price cache read failed");
                None
            }
        }
    }
}

#[async_trait]
impl<P: DataProvider> DataProvider for CachedProvider<P> {
    async fn list_symbols(&self, universe: UniverseSelector) -> Result<Vec<String>> {
        self.inner.list_symbols(universe).await
    }

    async fn fetch_financials(&self, symbol: &str) -> Result<RawFinancials> {
        if let Some(hit) = self.cached_financials(symbol) {
            tracing::trace!(symbol, "financials cache hit");
            return Ok(hit);
        }

        let financials = self.inner.fetch_financials(symbol).await?;

        if let Err(e) = self
            .lock()
            .and_then(|cache| cache.put_financials(&financials))
        {
            tracing::warn!(symbol, error = %e, "failed to cache financials");
        }

        Ok(financials)
    }

    async fn fetch_price_history(
        &self,
        symbol: &str,
        trading_days: usize,
    ) -> Result<Vec<PricePoint>> {
        if let Some(hit) = self.cached_prices(symbol, trading_days) {
            tracing::trace!(symbol, "price cache hit");
            return Ok(hit);
        }

        let prices = self.inner.fetch_price_history(symbol, trading_days).await?;

        if let Err(e) = self
            .lock()
            .and_then(|cache| cache.put_prices(symbol, trading_days, &prices))
        {
            tracing::warn!(symbol, error = %e, "failed to cache prices");
        }

        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryProvider;
    use chrono::NaiveDate;

    fn provider() -> InMemoryProvider {
        let mut raw = RawFinancials::new("AAPL");
        raw.ebit = Some(10.0);
        InMemoryProvider::new().with_financials(raw).with_prices(
            "AAPL",
            vec![
                PricePoint::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 101.0),
                PricePoint::new(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(), 102.0),
            ],
        )
    }

    #[tokio::test]
    async fn test_read_through() {
        let cached = CachedProvider::new(
            provider(),
            SqliteCache::in_memory().unwrap(),
            CachePolicy::default(),
        );

        let first = cached.fetch_financials("AAPL").await.unwrap();
        let stats = cached.lock().unwrap().get_stats().unwrap();
        assert_eq!(stats.financials, 1);

        let second = cached.fetch_financials("AAPL").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_served_from_cache_when_inner_fails() {
        let cache = SqliteCache::in_memory().unwrap();
        let mut raw = RawFinancials::new("MSFT");
        raw.ebit = Some(5.0);
        cache.put_financials(&raw).unwrap();

        let cached = CachedProvider::new(
            InMemoryProvider::new().with_failure("MSFT"),
            cache,
            CachePolicy::default(),
        );

        let hit = cached.fetch_financials("MSFT").await.unwrap();
        assert_eq!(hit.ebit, Some(5.0));
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_cache() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.put_financials(&RawFinancials::new("MSFT")).unwrap();

        let cached = CachedProvider::new(
            InMemoryProvider::new().with_failure("MSFT"),
            cache,
            CachePolicy {
                force_refresh: true,
                ..CachePolicy::default()
            },
        );

        assert!(cached.fetch_financials("MSFT").await.is_err());
    }

    #[tokio::test]
    async fn test_prices_cached() {
        let cached = CachedProvider::new(
            provider(),
            SqliteCache::in_memory().unwrap(),
            CachePolicy::default(),
        );

        let fetched = cached.fetch_price_history("AAPL", 1).await.unwrap();
        let hit = cached.cached_prices("AAPL", 1).unwrap();
        assert_eq!(fetched, hit);
        assert_eq!(hit[0].close, 102.0);
    }

    #[tokio::test]
    async fn test_failures_not_cached() {
        let cached = CachedProvider::new(
            InMemoryProvider::new(),
            SqliteCache::in_memory().unwrap(),
            CachePolicy::default(),
        );

        assert!(cached.fetch_financials("NOPE").await.is_err());
        assert_eq!(cached.lock().unwrap().get_stats().unwrap().financials, 0);
    }
}
