//! Terminal progress reporting.

use indicatif::{ProgressBar, ProgressStyle};
use magic_screen::{ScreenObserver, ScreenStats, SymbolOutcome};
use std::time::Duration;

/// Drives an `indicatif` bar from screener callbacks.
#[derive(Debug)]
pub(crate) struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    /// A bar drawn to stderr.
    pub(crate) fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        bar.set_style(style);
        Self { bar }
    }

    /// A bar that never draws (used with `--quiet`).
    pub(crate) fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl ScreenObserver for ProgressObserver {
    fn on_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.enable_steady_tick(Duration::from_millis(100));
        self.bar.set_message("Screening...");
    }

    fn on_symbol(&self, _index: usize, symbol: &str, outcome: &SymbolOutcome) {
        self.bar.inc(1);
        if outcome.is_accepted() {
            self.bar.set_message(format!("{symbol} accepted"));
        } else {
            self.bar.set_message(symbol.to_string());
        }
    }

    fn on_finish(&self, stats: &ScreenStats) {
        let mut message = format!(
            "Accepted {} of {} scanned",
            stats.accepted, stats.scanned
        );
        if stats.early_exit {
            message.push_str(" (stopped early)");
        }
        self.bar.finish_with_message(message);
    }
}
