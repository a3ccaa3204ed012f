//! SQLite caching layer for provider data.

use crate::error::{DataError, Result};
use crate::types::{PricePoint, RawFinancials};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// SQLite cache for financials and price histories.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Connection,
}

impl SqliteCache {
    /// Create a new SQLite cache.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        // Latest financials per symbol, stored as the serialized record
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS financials (
                symbol TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                cached_at TEXT NOT NULL
            )",
            [],
        )?;

        // Daily closes
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS prices (
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                close REAL NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (symbol, date)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_prices_symbol_date ON prices(symbol, date)",
            [],
        )?;

        // Depth of the last price fetch per symbol
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS price_fetches (
                symbol TEXT PRIMARY KEY,
                trading_days INTEGER NOT NULL,
                cached_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Get cached financials if they are younger than `max_age`.
    pub fn get_financials(&self, symbol: &str, max_age: Duration) -> Result<Option<RawFinancials>> {
        let cutoff = (Utc::now() - max_age).to_rfc3339();

        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM financials WHERE symbol = ?1 AND cached_at >= ?2",
                params![symbol, cutoff],
                |row| row.get(0),
            )
            .optional()?;

        payload
            .map(|p| serde_json::from_str(&p).map_err(DataError::from))
            .transpose()
    }

    /// Store financials for a symbol, replacing any previous entry.
    pub fn put_financials(&self, financials: &RawFinancials) -> Result<()> {
        let payload = serde_json::to_string(financials)?;

        self.conn.execute(
            "INSERT OR REPLACE INTO financials (symbol, payload, cached_at)
             VALUES (?1, ?2, ?3)",
            params![financials.symbol, payload, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Get a cached price history, most-recent-first.
    ///
    /// Returns `None` unless the last fetch for the symbol is younger than
    /// `max_age` and was at least `trading_days` deep.
    pub fn get_prices(
        &self,
        symbol: &str,
        trading_days: usize,
        max_age: Duration,
    ) -> Result<Option<Vec<PricePoint>>> {
        let cutoff = (Utc::now() - max_age).to_rfc3339();

        let depth: Option<i64> = self
            .conn
            .query_row(
                "SELECT trading_days FROM price_fetches WHERE symbol = ?1 AND cached_at >= ?2",
                params![symbol, cutoff],
                |row| row.get(0),
            )
            .optional()?;

        match depth {
            Some(depth) if depth >= trading_days as i64 => {}
            _ => return Ok(None),
        }

        let mut stmt = self.conn.prepare(
            "SELECT date, close FROM prices
             WHERE symbol = ?1
             ORDER BY date DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![symbol, trading_days as i64 + 1], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?;

        let mut prices = Vec::new();
        for row in rows {
            let (date, close) = row?;
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| DataError::Cache(format!("Invalid cached date {date}: {e}")))?;
            prices.push(PricePoint::new(date, close));
        }

        Ok(Some(prices))
    }

    /// Store a price history for a symbol, replacing previous rows.
    pub fn put_prices(&self, symbol: &str, trading_days: usize, prices: &[PricePoint]) -> Result<()> {
        let cached_at = Utc::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM prices WHERE symbol = ?1", params![symbol])?;

        for point in prices {
            tx.execute(
                "INSERT OR REPLACE INTO prices (symbol, date, close, cached_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![symbol, point.date.to_string(), point.close, cached_at],
            )?;
        }

        tx.execute(
            "INSERT OR REPLACE INTO price_fetches (symbol, trading_days, cached_at)
             VALUES (?1, ?2, ?3)",
            params![symbol, trading_days as i64, cached_at],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Clear all cached data.
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM financials", [])?;
        self.conn.execute("DELETE FROM prices", [])?;
        self.conn.execute("DELETE FROM price_fetches", [])?;
        Ok(())
    }

    /// Clear cached data for a specific symbol.
    pub fn clear_symbol(&self, symbol: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM financials WHERE symbol = ?1", params![symbol])?;
        self.conn
            .execute("DELETE FROM prices WHERE symbol = ?1", params![symbol])?;
        self.conn.execute(
            "DELETE FROM price_fetches WHERE symbol = ?1",
            params![symbol],
        )?;
        Ok(())
    }

    /// Get cache statistics.
    pub fn get_stats(&self) -> Result<CacheStats> {
        let financials_count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM financials", [], |row| row.get(0))?;

        let price_rows: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM prices", [], |row| row.get(0))?;

        let price_symbols: i64 =
            self.conn
                .query_row("SELECT COUNT(DISTINCT symbol) FROM prices", [], |row| {
                    row.get(0)
                })?;

        let (oldest, newest): (Option<String>, Option<String>) = self.conn.query_row(
            "SELECT MIN(cached_at), MAX(cached_at) FROM (
                SELECT cached_at FROM financials
                UNION ALL
                SELECT cached_at FROM price_fetches
            )",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(CacheStats {
            financials: financials_count as usize,
            price_rows: price_rows as usize,
            price_symbols: price_symbols as usize,
            oldest_entry: oldest.as_deref().and_then(parse_timestamp),
            newest_entry: newest.as_deref().and_then(parse_timestamp),
        })
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of symbols with cached financials
    pub financials: usize,
    /// Total number of cached daily closes
    pub price_rows: usize,
    /// Number of symbols with cached prices
    pub price_symbols: usize,
    /// Oldest cache write
    pub oldest_entry: Option<DateTime<Utc>>,
    /// Newest cache write
    pub newest_entry: Option<DateTime<Utc>>,
}
