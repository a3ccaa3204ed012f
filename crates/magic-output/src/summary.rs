//! Human-readable run summaries.
//!
//! A [`ScreenSummary`] bundles the run parameters, the counters collected by
//! the screener and the ranked rows, and renders them for a terminal or as
//! Markdown.

use crate::export::ScreenResultRecord;
use chrono::{DateTime, Utc};
use magic_screen::{ScreenReport, ScreenStats};
use serde::{Deserialize, Serialize};
use std::fmt;

const RULE_WIDTH: usize = 112;

/// Summary of one screening run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScreenSummary {
    /// Universe identifier (e.g. `broad-index`).
    pub universe: String,

    /// Market cap floor used.
    pub min_market_cap: f64,

    /// Result limit used, if any.
    pub limit: Option<usize>,

    /// When the run finished.
    pub generated_at: DateTime<Utc>,

    /// Run counters.
    pub stats: ScreenStats,

    /// Ranked rows, best first.
    pub results: Vec<ScreenResultRecord>,
}

impl ScreenSummary {
    /// Create a summary from a screening report.
    ///
    /// # Examples
    ///
    /// ```
    /// use magic_output::ScreenSummary;
    /// use magic_screen::ScreenReport;
    ///
    /// let summary = ScreenSummary::new("large-cap", 50_000_000.0, Some(30), &ScreenReport::default());
    /// assert!(summary.results.is_empty());
    /// assert!(summary.to_ascii_table().contains("No companies passed"));
    /// ```
    pub fn new(
        universe: impl Into<String>,
        min_market_cap: f64,
        limit: Option<usize>,
        report: &ScreenReport,
    ) -> Self {
        Self {
            universe: universe.into(),
            min_market_cap,
            limit,
            generated_at: Utc::now(),
            stats: report.stats.clone(),
            results: ScreenResultRecord::from_candidates(&report.candidates),
        }
    }

    /// Skipped symbols, all reasons combined.
    pub const fn skipped(&self) -> usize {
        self.stats.fetch_failures
            + self.stats.missing_fields
            + self.stats.below_market_cap
            + self.stats.non_positive_metrics
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nMagic Formula Screen: {}\n", self.universe));
        output.push_str(&format!(
            "Generated {} | min market cap {} | limit {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M UTC"),
            format_money(Some(self.min_market_cap)),
            self.limit.map_or_else(|| "none".to_string(), |l| l.to_string())
        ));
        output.push_str(&"=".repeat(RULE_WIDTH));
        output.push('\n');

        if self.results.is_empty() {
            output.push_str("No companies passed the screen.\n");
        } else {
            output.push_str(&format!(
                "{:>4} {:<7} {:<28} {:<20} {:>10} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}\n",
                "#", "Symbol", "Name", "Sector", "Mkt Cap", "EY %", "ROC %", "1D %", "1M %",
                "1Y %", "Score"
            ));
            output.push_str(&"-".repeat(RULE_WIDTH));
            output.push('\n');

            for row in &self.results {
                output.push_str(&format!(
                    "{:>4} {:<7} {:<28} {:<20} {:>10} {:>8.2} {:>8.2} {:>8} {:>8} {:>8} {:>8.1}\n",
                    row.rank,
                    row.symbol,
                    clip(&row.name, 28),
                    clip(&row.sector, 20),
                    format_money(row.market_cap),
                    row.earnings_yield,
                    row.return_on_capital,
                    format_pct(row.return_1d),
                    format_pct(row.return_1m),
                    format_pct(row.return_1y),
                    row.combined_rank
                ));
            }
        }

        output.push_str(&"=".repeat(RULE_WIDTH));
        output.push('\n');
        output.push_str(&format!("{}\n", self.stats_line()));

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Magic Formula Screen: {}\n\n", self.universe));
        output.push_str(&format!(
            "**Generated:** {}  \n**Minimum market cap:** {}  \n**Limit:** {}\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M UTC"),
            format_money(Some(self.min_market_cap)),
            self.limit.map_or_else(|| "none".to_string(), |l| l.to_string())
        ));

        if self.results.is_empty() {
            output.push_str("_No companies passed the screen._\n\n");
        } else {
            output.push_str(
                "| # | Symbol | Name | Sector | Market Cap | EY % | ROC % | 1D % | 1M % | 1Y % | EY Rank | ROC Rank | Combined |\n",
            );
            output.push_str(
                "|---|--------|------|--------|------------|------|-------|------|------|------|---------|----------|----------|\n",
            );

            for row in &self.results {
                output.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {:.2} | {:.2} | {} | {} | {} | {} | {} | {} |\n",
                    row.rank,
                    row.symbol,
                    row.name.replace('|', "\\|"),
                    row.sector,
                    format_money(row.market_cap),
                    row.earnings_yield,
                    row.return_on_capital,
                    format_pct(row.return_1d),
                    format_pct(row.return_1m),
                    format_pct(row.return_1y),
                    row.ey_rank,
                    row.roc_rank,
                    row.combined_rank
                ));
            }
            output.push('\n');
        }

        output.push_str("## Run Statistics\n\n");
        output.push_str(&format!("- **Scanned:** {} of {}\n", self.stats.scanned, self.stats.universe_size));
        output.push_str(&format!("- **Accepted:** {}\n", self.stats.accepted));
        output.push_str(&format!("- **Fetch failures:** {}\n", self.stats.fetch_failures));
        output.push_str(&format!("- **Missing data:** {}\n", self.stats.missing_fields));
        output.push_str(&format!("- **Below market cap:** {}\n", self.stats.below_market_cap));
        output.push_str(&format!(
            "- **Non-positive metrics:** {}\n",
            self.stats.non_positive_metrics
        ));
        output.push_str(&format!("- **Price history failures:** {}\n", self.stats.price_failures));
        if self.stats.early_exit {
            output.push_str(
                "\n> Scanning stopped early once enough candidates were found; results cover a partial universe.\n",
            );
        }

        output
    }

    fn stats_line(&self) -> String {
        let mut line = format!(
            "Scanned {}/{} | accepted {} | skipped {} (fetch {}, missing {}, small {}, non-positive {})",
            self.stats.scanned,
            self.stats.universe_size,
            self.stats.accepted,
            self.skipped(),
            self.stats.fetch_failures,
            self.stats.missing_fields,
            self.stats.below_market_cap,
            self.stats.non_positive_metrics
        );
        if self.stats.early_exit {
            line.push_str(" | stopped early");
        }
        line
    }
}

impl fmt::Display for ScreenSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Magic Formula Screen: {} ({} results)",
            self.universe,
            self.results.len()
        )?;
        for row in self.results.iter().take(5) {
            writeln!(
                f,
                "  {}. {} EY {:.2}% ROC {:.2}%",
                row.rank, row.symbol, row.earnings_yield, row.return_on_capital
            )?;
        }
        writeln!(f, "  {}", self.stats_line())
    }
}

/// Format a currency amount with a magnitude suffix.
pub fn format_money(value: Option<f64>) -> String {
    let Some(v) = value else {
        return "-".to_string();
    };
    let abs = v.abs();
    if abs >= 1e12 {
        format!("{:.2}T", v / 1e12)
    } else if abs >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else {
        format!("{v:.0}")
    }
}

fn format_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
        clipped.push('~');
        clipped
    }
}
