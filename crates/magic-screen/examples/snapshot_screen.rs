//! Screen a small hand-made snapshot without network access.
//!
//! Run with: `cargo run -p magic-screen --example snapshot_screen`

use magic_data::{InMemoryProvider, RawFinancials, UniverseSelector};
use magic_screen::{ScreenConfig, Screener};

fn company(symbol: &str, name: &str, ebit: f64, ev: f64, assets: f64) -> RawFinancials {
    let mut raw = RawFinancials::new(symbol);
    raw.name = name.to_string();
    raw.sector = "Example".to_string();
    raw.market_cap = Some(ev * 0.9);
    raw.ebit = Some(ebit);
    raw.enterprise_value = Some(ev);
    raw.total_assets = Some(assets);
    raw.total_current_assets = Some(assets * 0.3);
    raw.total_current_liabilities = Some(assets * 0.2);
    raw.intangible_assets = Some(assets * 0.05);
    raw
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = [
        company("ALFA", "Alfa Industries", 1.2e9, 9.0e9, 6.0e9),
        company("BRVO", "Bravo Retail", 4.0e8, 2.5e9, 4.0e9),
        company("CHRL", "Charlie Mining", 2.1e9, 1.1e10, 2.0e10),
        company("DLTA", "Delta Software", 9.0e8, 3.0e10, 2.0e9),
        company("ECHO", "Echo Utilities", -1.0e8, 5.0e9, 8.0e9),
    ];
    let symbols: Vec<String> = snapshot.iter().map(|c| c.symbol.clone()).collect();

    let provider = snapshot
        .into_iter()
        .fold(InMemoryProvider::new(), |p, raw| p.with_financials(raw))
        .with_universe(UniverseSelector::BroadIndex, symbols);

    let screener = Screener::new(
        provider,
        ScreenConfig::default().with_max_results(Some(3)).without_pacing(),
    );
    let report = screener.screen_universe(UniverseSelector::BroadIndex).await?;

    println!("{:<6} {:>8} {:>8} {:>8}", "Symbol", "EY %", "ROC %", "Rank");
    for c in &report.candidates {
        println!(
            "{:<6} {:>8.2} {:>8.2} {:>8.1}",
            c.symbol(),
            c.metrics.earnings_yield,
            c.metrics.return_on_capital,
            c.combined_rank
        );
    }
    println!("{:?}", report.stats);

    Ok(())
}
