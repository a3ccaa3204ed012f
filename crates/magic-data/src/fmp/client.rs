//! Financial Modeling Prep API client with rate limiting.

use super::types::{
    BalanceSheet, CompanyProfile, Constituent, HistoricalPriceResponse, IncomeStatement,
    KeyMetrics, TradableSymbol, merge_financials,
};
use crate::error::{DataError, Result};
use crate::provider::DataProvider;
use crate::types::{PricePoint, RawFinancials, sort_most_recent_first};
use crate::universe::UniverseSelector;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// FMP v3 API base URL
pub const FMP_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "FMP_API_KEY";

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "FMP_BASE_URL";

/// Default minimum spacing between requests
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(250);

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fallback back-off when a 429 carries no Retry-After header
const DEFAULT_RETRY_AFTER_MS: u64 = 60_000;

const USER_AGENT: &str = "magic-screener/0.1";

/// Configuration for [`FmpClient`].
#[derive(Clone)]
pub struct FmpConfig {
    /// API key sent as the `apikey` query parameter
    pub api_key: String,
    /// Base URL of the v3 API
    pub base_url: String,
    /// Minimum duration between consecutive requests
    pub min_interval: Duration,
    /// Timeout applied to each request
    pub timeout: Duration,
}

impl FmpConfig {
    /// Create a configuration with default endpoint and pacing.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: FMP_BASE_URL.to_string(),
            min_interval: DEFAULT_MIN_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read the API key (and optional base URL) from the environment.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| DataError::Config(format!("{API_KEY_ENV} is not set")))?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        Ok(config)
    }

    /// Set the minimum spacing between requests.
    pub const fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Set the per-request timeout.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl std::fmt::Debug for FmpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FmpConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("min_interval", &self.min_interval)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Rate limiter enforcing a minimum interval between requests
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// Financial Modeling Prep API client
pub struct FmpClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    config: FmpConfig,
}

impl FmpClient {
    /// Create a new client from an explicit configuration.
    ///
    /// # Example
    /// ```no_run
    /// use magic_data::fmp::{FmpClient, FmpConfig};
    /// use std::time::Duration;
    ///
    /// # fn example() -> magic_data::Result<()> {
    /// let config = FmpConfig::new("my-key").with_min_interval(Duration::from_millis(500));
    /// let client = FmpClient::new(config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: FmpConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(DataError::Config("FMP API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(config.min_interval))),
            config,
        })
    }

    /// Create a client from `FMP_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::new(FmpConfig::from_env()?)
    }

    /// The active configuration.
    pub const fn config(&self) -> &FmpConfig {
        &self.config
    }

    /// Issue a rate-limited GET and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        context: &str,
    ) -> Result<T> {
        self.rate_limiter.lock().await.wait().await;

        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        tracing::trace!(%url, "FMP request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("apikey", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(DataError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(
                status,
                retry_after.as_deref(),
                &body,
                context,
            ));
        }

        let body = response.text().await.map_err(DataError::Network)?;
        decode_body(&body, context)
    }

    /// Fetch the first element of an array endpoint.
    async fn get_latest<T: DeserializeOwned>(&self, path: &str, symbol: &str) -> Result<Option<T>> {
        let rows: Vec<T> = self
            .get_json(path, &[("limit", "1".to_string())], symbol)
            .await?;
        Ok(rows.into_iter().next())
    }
}

/// Map a non-success HTTP status to a [`DataError`].
fn status_error(
    status: StatusCode,
    retry_after: Option<&str>,
    body: &str,
    context: &str,
) -> DataError {
    match status {
        StatusCode::NOT_FOUND => DataError::NotFound(context.to_string()),
        StatusCode::TOO_MANY_REQUESTS => DataError::RateLimit {
            retry_after_ms: retry_after
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map_or(DEFAULT_RETRY_AFTER_MS, |secs| secs * 1000),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DataError::Config(format!("FMP rejected the API key (HTTP {})", status.as_u16()))
        }
        _ => DataError::Api {
            status: status.as_u16(),
            message: truncate(body, 200),
        },
    }
}

/// Decode a JSON body, surfacing FMP's in-band `{"Error Message": ...}` replies.
fn decode_body<T: DeserializeOwned>(body: &str, context: &str) -> Result<T> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| DataError::Parse(format!("{context}: {e}")))?;

    if let Some(message) = value.get("Error Message").and_then(|m| m.as_str()) {
        return Err(if message.to_lowercase().contains("api key") {
            DataError::Config(message.to_string())
        } else {
            DataError::Api {
                status: 200,
                message: message.to_string(),
            }
        });
    }

    serde_json::from_value(value).map_err(|e| DataError::Parse(format!("{context}: {e}")))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max).collect();
        out.push('…');
        out
    }
}

/// Calendar days needed to cover a number of trading sessions.
///
/// Roughly five sessions per seven days, plus a month of slack for holidays.
pub const fn calendar_window(trading_days: usize) -> i64 {
    (trading_days as i64 * 7) / 5 + 30
}

/// Keep first occurrences, preserving order.
fn dedup_symbols(symbols: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

#[async_trait]
impl DataProvider for FmpClient {
    async fn list_symbols(&self, universe: UniverseSelector) -> Result<Vec<String>> {
        let context = universe.id();
        let symbols = match universe {
            UniverseSelector::BroadIndex => {
                let rows: Vec<Constituent> =
                    self.get_json("sp500_constituent", &[], context).await?;
                dedup_symbols(rows.into_iter().map(|c| c.symbol))
            }
            UniverseSelector::LargeCap => {
                let rows: Vec<Constituent> =
                    self.get_json("dowjones_constituent", &[], context).await?;
                dedup_symbols(rows.into_iter().map(|c| c.symbol))
            }
            UniverseSelector::AllTradable => {
                let rows: Vec<TradableSymbol> =
                    self.get_json("available-traded/list", &[], context).await?;
                dedup_symbols(rows.into_iter().filter(|s| s.is_stock()).map(|s| s.symbol))
            }
        };

        tracing::debug!(universe = %universe, count = symbols.len(), "listed universe");
        Ok(symbols)
    }

    async fn fetch_financials(&self, symbol: &str) -> Result<RawFinancials> {
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let income_path = format!("income-statement/{symbol}");
        let balance_path = format!("balance-sheet-statement/{symbol}");
        let metrics_path = format!("key-metrics/{symbol}");
        let profile_path = format!("profile/{symbol}");

        let (income, balance, metrics, profile) = futures::try_join!(
            self.get_latest::<IncomeStatement>(&income_path, symbol),
            self.get_latest::<BalanceSheet>(&balance_path, symbol),
            self.get_latest::<KeyMetrics>(&metrics_path, symbol),
            async {
                let rows: Vec<CompanyProfile> =
                    self.get_json(&profile_path, &[], symbol).await?;
                Ok::<_, DataError>(rows.into_iter().next())
            },
        )?;

        merge_financials(
            symbol,
            income.as_ref(),
            balance.as_ref(),
            metrics.as_ref(),
            profile.as_ref(),
        )
    }

    async fn fetch_price_history(
        &self,
        symbol: &str,
        trading_days: usize,
    ) -> Result<Vec<PricePoint>> {
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let to = Utc::now().date_naive();
        let from = to - ChronoDuration::days(calendar_window(trading_days));

        let response: HistoricalPriceResponse = self
            .get_json(
                &format!("historical-price-full/{symbol}"),
                &[
                    ("from", from.format("%Y-%m-%d").to_string()),
                    ("to", to.format("%Y-%m-%d").to_string()),
                ],
                symbol,
            )
            .await?;

        let mut prices = response.into_price_points();
        sort_most_recent_first(&mut prices);
        Ok(prices)
    }
}

impl std::fmt::Debug for FmpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FmpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
