//! Persistence of the SQLite cache behind a provider.

use chrono::{Days, NaiveDate};
use magic_data::cache::{CachePolicy, CachedProvider, SqliteCache};
use magic_data::{DataProvider, InMemoryProvider, PricePoint, RawFinancials};

fn financials() -> RawFinancials {
    let mut raw = RawFinancials::new("JNJ");
    raw.name = "Johnson & Johnson".to_string();
    raw.sector = "Healthcare".to_string();
    raw.market_cap = Some(3.8e11);
    raw.ebit = Some(2.2e10);
    raw.enterprise_value = Some(4.0e11);
    raw.goodwill = Some(3.6e10);
    raw
}

fn closes(n: usize) -> Vec<PricePoint> {
    let latest = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
    (0..n)
        .map(|i| PricePoint::new(latest - Days::new(i as u64), 150.0 + i as f64))
        .collect()
}

#[tokio::test]
async fn test_cache_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");

    {
        let live = InMemoryProvider::new()
            .with_financials(financials())
            .with_prices("JNJ", closes(30));
        let cached =
            CachedProvider::new(live, SqliteCache::new(&path).unwrap(), CachePolicy::default());
        cached.fetch_financials("JNJ").await.unwrap();
        cached.fetch_price_history("JNJ", 21).await.unwrap();
    }

    // the live source is gone; everything must come from disk
    let offline = InMemoryProvider::new().with_failure("JNJ");
    let cached =
        CachedProvider::new(offline, SqliteCache::new(&path).unwrap(), CachePolicy::default());

    let raw = cached.fetch_financials("JNJ").await.unwrap();
    assert_eq!(raw, financials());

    let prices = cached.fetch_price_history("JNJ", 21).await.unwrap();
    assert_eq!(prices.len(), 22);
    assert_eq!(prices[0].close, 150.0);
    assert!(prices.windows(2).all(|w| w[0].date > w[1].date));
}

#[tokio::test]
async fn test_deeper_request_misses_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");

    let cache = SqliteCache::new(&path).unwrap();
    cache.put_prices("JNJ", 5, &closes(6)).unwrap();

    let cached = CachedProvider::new(
        InMemoryProvider::new().with_failure("JNJ"),
        cache,
        CachePolicy::default(),
    );
    assert!(cached.fetch_price_history("JNJ", 252).await.is_err());
    assert_eq!(cached.fetch_price_history("JNJ", 5).await.unwrap().len(), 6);
}
