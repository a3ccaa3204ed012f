//! Magic Formula screener CLI.
//!
//! Screens a stock universe by earnings yield and return on capital.

mod integration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use integration::cache_manager;
use integration::pipeline::{FetchConfig, build_provider};
use integration::progress::ProgressObserver;
use magic::prelude::*;
use magic_data::cache::DEFAULT_MAX_AGE_HOURS;
use magic_data::fmp::API_KEY_ENV;
use magic_screen::{DEFAULT_MAX_RESULTS, DEFAULT_MIN_MARKET_CAP};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "magic")]
#[command(about = "Magic Formula stock screener", long_about = None)]
#[command(version)]
struct Cli {
    /// Financial Modeling Prep API key
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Override the API base URL
    #[arg(long, global = true, env = "FMP_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen a universe and print the top ranked companies
    Screen(ScreenArgs),

    /// List the symbols of a universe
    Universe {
        /// Universe to list
        #[arg(long, default_value = "broad-index")]
        universe: UniverseSelector,

        /// List the available universes instead
        #[arg(long)]
        list: bool,
    },

    /// Inspect or clear the local data cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Args)]
struct ScreenArgs {
    /// Universe to screen
    #[arg(long, default_value = "broad-index")]
    universe: UniverseSelector,

    /// Number of results to return
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    limit: usize,

    /// Minimum market capitalization
    #[arg(long, default_value_t = DEFAULT_MIN_MARKET_CAP)]
    min_market_cap: f64,

    /// Scan the whole universe instead of stopping at 3x the limit
    #[arg(long)]
    full_scan: bool,

    /// Write results as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write results as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Output format for stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Disable caching (always fetch fresh data)
    #[arg(long)]
    no_cache: bool,

    /// Force refresh cached data
    #[arg(long)]
    refresh: bool,

    /// Maximum age of cached data in hours
    #[arg(long, default_value_t = DEFAULT_MAX_AGE_HOURS)]
    cache_hours: i64,

    /// Hide the progress bar
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show cache location and contents
    Stats,

    /// Delete cached data
    Clear {
        /// Only clear this symbol
        #[arg(long)]
        symbol: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let fetch = FetchConfig {
        api_key: cli.api_key,
        base_url: cli.base_url,
        use_cache: true,
        force_refresh: false,
        max_age_hours: DEFAULT_MAX_AGE_HOURS,
    };

    match cli.command {
        Commands::Screen(args) => screen(args, fetch).await?,
        Commands::Universe { universe, list } => {
            if list {
                list_universes();
            } else {
                list_symbols(universe, fetch).await?;
            }
        }
        Commands::Cache { action } => cache(action)?,
    }

    Ok(())
}

async fn screen(args: ScreenArgs, fetch: FetchConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ScreenConfig::default()
        .with_min_market_cap(args.min_market_cap)
        .with_max_results(Some(args.limit));
    if args.full_scan {
        config = config.full_scan();
    }
    config.validate()?;

    let provider = build_provider(&FetchConfig {
        use_cache: !args.no_cache,
        force_refresh: args.refresh,
        max_age_hours: args.cache_hours,
        ..fetch
    })?;

    let observer = Arc::new(if args.quiet {
        ProgressObserver::hidden()
    } else {
        ProgressObserver::new()
    });
    let screener = Screener::new(provider, config.clone()).with_observer(observer);
    let report = screener.screen_universe(args.universe).await?;

    let summary = ScreenSummary::new(
        args.universe.id(),
        config.min_market_cap,
        config.max_results,
        &report,
    );
    match args.format {
        OutputFormat::Text => println!("{}", summary.to_ascii_table()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Markdown => println!("{}", summary.to_markdown()),
    }

    if let Some(path) = &args.csv {
        report.candidates.export_to_file(path, ExportFormat::Csv)?;
        eprintln!("Results saved to {}", path.display());
    }
    if let Some(path) = &args.json {
        report
            .candidates
            .export_to_file(path, ExportFormat::PrettyJson)?;
        eprintln!("Results saved to {}", path.display());
    }

    Ok(())
}

fn list_universes() {
    println!("Available universes:");
    for universe in UniverseSelector::all() {
        println!("  {:<14} {}", universe.id(), universe.description());
    }
}

async fn list_symbols(
    universe: UniverseSelector,
    fetch: FetchConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider = build_provider(&FetchConfig {
        use_cache: false,
        ..fetch
    })?;
    let symbols = provider.list_symbols(universe).await?;

    for symbol in &symbols {
        println!("{symbol}");
    }
    eprintln!("{} symbols in {}", symbols.len(), universe);

    Ok(())
}

fn cache(action: CacheAction) -> Result<(), Box<dyn std::error::Error>> {
    let path = cache_manager::default_cache_path();
    let cache = cache_manager::open_cache()?;

    match action {
        CacheAction::Stats => {
            println!("{}", cache_manager::format_stats(&path, &cache.get_stats()?));
        }
        CacheAction::Clear { symbol: Some(symbol) } => {
            let symbol = symbol.to_uppercase();
            cache.clear_symbol(&symbol)?;
            println!("Cleared cached data for {symbol}");
        }
        CacheAction::Clear { symbol: None } => {
            cache.clear_all()?;
            println!("Cleared cache at {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_screen_defaults() {
        let cli = Cli::try_parse_from(["magic", "screen"]).unwrap();
        let Commands::Screen(args) = cli.command else {
            panic!("expected screen command");
        };
        assert_eq!(args.universe, UniverseSelector::BroadIndex);
        assert_eq!(args.limit, 30);
        assert_eq!(args.min_market_cap, 50_000_000.0);
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!args.full_scan);
    }

    #[test]
    fn test_screen_flags() {
        let cli = Cli::try_parse_from([
            "magic",
            "screen",
            "--universe",
            "dow",
            "--limit",
            "10",
            "--min-market-cap",
            "1e9",
            "--full-scan",
            "--format",
            "markdown",
            "--csv",
            "out.csv",
            "--api-key",
            "k",
        ])
        .unwrap();
        assert_eq!(cli.api_key.as_deref(), Some("k"));
        let Commands::Screen(args) = cli.command else {
            panic!("expected screen command");
        };
        assert_eq!(args.universe, UniverseSelector::LargeCap);
        assert_eq!(args.limit, 10);
        assert_eq!(args.min_market_cap, 1e9);
        assert!(args.full_scan);
        assert_eq!(args.format, OutputFormat::Markdown);
        assert_eq!(args.csv, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn test_unknown_universe_rejected() {
        assert!(Cli::try_parse_from(["magic", "screen", "--universe", "nasdaq"]).is_err());
    }

    #[test]
    fn test_cache_clear_symbol() {
        let cli = Cli::try_parse_from(["magic", "cache", "clear", "--symbol", "aapl"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Cache {
                action: CacheAction::Clear { symbol: Some(ref s) }
            } if s == "aapl"
        ));
    }
}
