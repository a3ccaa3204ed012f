//! The screening pipeline: fetch, filter, compute, rank.

use crate::config::ScreenConfig;
use crate::error::ScreenError;
use crate::metrics::compute_metrics;
use crate::rank::{Candidate, RankedCandidate, rank_candidates};
use crate::returns::{ReturnMetrics, compute_returns};
use magic_data::{DataProvider, UniverseSelector};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Why a symbol did or did not become a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolOutcome {
    /// Accepted as a candidate
    Accepted,
    /// The financials request failed
    FetchFailed(String),
    /// A required attribute was absent
    MissingField(&'static str),
    /// Market cap under the floor
    BelowMarketCap,
    /// Earnings yield or return on capital not positive
    NonPositiveMetrics,
}

impl SymbolOutcome {
    /// Whether the symbol became a candidate.
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Counters describing a screening run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenStats {
    /// Symbols in the input list
    pub universe_size: usize,
    /// Symbols actually evaluated
    pub scanned: usize,
    /// Financials fetch failures
    pub fetch_failures: usize,
    /// Symbols missing a required attribute
    pub missing_fields: usize,
    /// Symbols under the market cap floor
    pub below_market_cap: usize,
    /// Symbols with a non-positive metric
    pub non_positive_metrics: usize,
    /// Candidates whose price history could not be fetched
    pub price_failures: usize,
    /// Symbols accepted as candidates
    pub accepted: usize,
    /// Scanning stopped before the end of the list
    pub early_exit: bool,
}

impl ScreenStats {
    fn record(&mut self, outcome: &SymbolOutcome) {
        self.scanned += 1;
        match outcome {
            SymbolOutcome::Accepted => self.accepted += 1,
            SymbolOutcome::FetchFailed(_) => self.fetch_failures += 1,
            SymbolOutcome::MissingField(_) => self.missing_fields += 1,
            SymbolOutcome::BelowMarketCap => self.below_market_cap += 1,
            SymbolOutcome::NonPositiveMetrics => self.non_positive_metrics += 1,
        }
    }
}

/// Result of a screening run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenReport {
    /// Ranked candidates, best first
    pub candidates: Vec<RankedCandidate>,
    /// Run counters
    pub stats: ScreenStats,
}

impl ScreenReport {
    /// Whether no company qualified.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Progress hook for long runs.
pub trait ScreenObserver: Send + Sync {
    /// Called once with the number of symbols to scan.
    fn on_start(&self, _total: usize) {}

    /// Called after each symbol is evaluated.
    fn on_symbol(&self, _index: usize, _symbol: &str, _outcome: &SymbolOutcome) {}

    /// Called when scanning ends, early or not.
    fn on_finish(&self, _stats: &ScreenStats) {}
}

/// Magic Formula screener over a data provider.
pub struct Screener<P> {
    provider: P,
    config: ScreenConfig,
    observer: Option<Arc<dyn ScreenObserver>>,
}

impl<P> std::fmt::Debug for Screener<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screener")
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl<P: DataProvider> Screener<P> {
    /// Create a screener.
    pub const fn new(provider: P, config: ScreenConfig) -> Self {
        Self {
            provider,
            config,
            observer: None,
        }
    }

    /// Attach a progress observer.
    pub fn with_observer(mut self, observer: Arc<dyn ScreenObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Active configuration.
    pub const fn config(&self) -> &ScreenConfig {
        &self.config
    }

    /// Underlying provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Screen the symbols of a universe with the configured limits.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::Universe`] if the symbol list cannot be loaded,
    /// or [`ScreenError::InvalidConfig`] for invalid configured limits.
    pub async fn screen_universe(
        &self,
        universe: UniverseSelector,
    ) -> Result<ScreenReport, ScreenError> {
        let symbols = self.provider.list_symbols(universe).await?;
        tracing::info!(%universe, symbols = symbols.len(), "loaded universe");
        self.run(&symbols).await
    }

    /// Screen a symbol list with the configured limits.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::InvalidConfig`] for invalid configured limits.
    pub async fn run(&self, symbols: &[String]) -> Result<ScreenReport, ScreenError> {
        self.screen(symbols, self.config.min_market_cap, self.config.max_results)
            .await
    }

    /// Screen a symbol list.
    ///
    /// Symbols are evaluated in order. A symbol is dropped when its
    /// financials cannot be fetched, a required attribute is missing, its
    /// market cap is below `min_market_cap` or either metric is not
    /// positive. Survivors are ranked and the best `max_results` returned.
    /// None of these per-symbol problems fail the run.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::InvalidConfig`] before fetching anything if
    /// `min_market_cap` is negative or not finite, or `max_results` is zero.
    pub async fn screen(
        &self,
        symbols: &[String],
        min_market_cap: f64,
        max_results: Option<usize>,
    ) -> Result<ScreenReport, ScreenError> {
        ScreenConfig::validate_limits(min_market_cap, max_results)?;
        let threshold = self.config.early_exit_threshold(max_results);
        let mut stats = ScreenStats {
            universe_size: symbols.len(),
            ..ScreenStats::default()
        };
        let mut candidates = Vec::new();

        tracing::info!(
            symbols = symbols.len(),
            min_market_cap,
            ?max_results,
            "screening started"
        );
        if let Some(observer) = &self.observer {
            observer.on_start(symbols.len());
        }

        for (index, symbol) in symbols.iter().enumerate() {
            self.pace(index).await;

            let outcome = match self.evaluate(symbol, min_market_cap, &mut stats).await {
                Ok(candidate) => {
                    candidates.push(candidate);
                    SymbolOutcome::Accepted
                }
                Err(outcome) => {
                    tracing::debug!(symbol = symbol.as_str(), ?outcome, "symbol skipped");
                    outcome
                }
            };

            stats.record(&outcome);
            if let Some(observer) = &self.observer {
                observer.on_symbol(index, symbol, &outcome);
            }

            if threshold.is_some_and(|t| candidates.len() >= t) {
                stats.early_exit = index + 1 < symbols.len();
                if stats.early_exit {
                    tracing::info!(
                        candidates = candidates.len(),
                        remaining = symbols.len() - index - 1,
                        "candidate target reached, stopping early"
                    );
                }
                break;
            }
        }

        let mut ranked = rank_candidates(candidates);
        if let Some(limit) = max_results {
            ranked.truncate(limit);
        }

        tracing::info!(
            scanned = stats.scanned,
            accepted = stats.accepted,
            fetch_failures = stats.fetch_failures,
            returned = ranked.len(),
            "screening finished"
        );
        if let Some(observer) = &self.observer {
            observer.on_finish(&stats);
        }

        Ok(ScreenReport {
            candidates: ranked,
            stats,
        })
    }

    async fn pace(&self, index: usize) {
        let every = self.config.pace_every;
        if every == 0 || index == 0 || index % every != 0 || self.config.pace_delay.is_zero() {
            return;
        }
        tokio::time::sleep(self.config.pace_delay).await;
    }

    async fn evaluate(
        &self,
        symbol: &str,
        min_market_cap: f64,
        stats: &mut ScreenStats,
    ) -> Result<Candidate, SymbolOutcome> {
        let raw = match self.provider.fetch_financials(symbol).await {
            Ok(raw) => raw,
            Err(e) => {
                if e.is_symbol_scoped() {
                    tracing::debug!(symbol, error = %e, "financials unavailable");
                } else {
                    tracing::warn!(symbol, error = %e, "failed to fetch financials");
                }
                return Err(SymbolOutcome::FetchFailed(e.to_string()));
            }
        };

        let market_cap = raw
            .market_cap
            .filter(|m| m.is_finite())
            .ok_or(SymbolOutcome::MissingField("market_cap"))?;
        if market_cap < min_market_cap {
            return Err(SymbolOutcome::BelowMarketCap);
        }

        let metrics = compute_metrics(&raw).map_err(|e| match e {
            ScreenError::MissingField { field, .. } => SymbolOutcome::MissingField(field),
            other => SymbolOutcome::FetchFailed(other.to_string()),
        })?;
        if !metrics.is_attractive() {
            return Err(SymbolOutcome::NonPositiveMetrics);
        }

        let returns = match self
            .provider
            .fetch_price_history(symbol, self.config.price_lookback_days)
            .await
        {
            Ok(prices) => compute_returns(&prices),
            Err(e) => {
                tracing::warn!(symbol, error = %e, "price history unavailable, returns left empty");
                stats.price_failures += 1;
                ReturnMetrics::default()
            }
        };

        Ok(Candidate { metrics, returns })
    }
}
