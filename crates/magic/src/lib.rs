#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/magic/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export main types from sub-crates
pub use magic_data as data;
pub use magic_output as output;
pub use magic_screen as screen;

/// Commonly used types.
pub mod prelude {
    pub use magic_data::{
        DataError, DataProvider, InMemoryProvider, PricePoint, RawFinancials, UniverseSelector,
    };
    pub use magic_output::{ExportFormat, Exporter, ScreenResultRecord, ScreenSummary};
    pub use magic_screen::{
        RankedCandidate, ScreenConfig, ScreenError, ScreenReport, ScreenStats, Screener,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[tokio::test]
    async fn test_prelude_pipeline() {
        let mut raw = RawFinancials::new("KO");
        raw.market_cap = Some(2.6e11);
        raw.ebit = Some(12.0);
        raw.enterprise_value = Some(100.0);
        raw.total_assets = Some(100.0);
        raw.total_current_assets = Some(20.0);
        raw.total_current_liabilities = Some(10.0);

        let provider = InMemoryProvider::new()
            .with_universe(UniverseSelector::LargeCap, vec!["KO".to_string()])
            .with_financials(raw);
        let screener = Screener::new(provider, ScreenConfig::default().without_pacing());
        let report = screener
            .screen_universe(UniverseSelector::LargeCap)
            .await
            .unwrap();

        let summary = ScreenSummary::new(UniverseSelector::LargeCap.id(), 5e7, Some(30), &report);
        assert_eq!(summary.results[0].symbol, "KO");
        assert_eq!(summary.results[0].earnings_yield, 12.0);
    }
}
