//! Cache manager for screening data.
//!
//! Resolves the SQLite cache with a platform-specific default location.

use magic_data::cache::{CacheStats, SqliteCache};
use magic_data::error::DataError;
use std::path::{Path, PathBuf};

/// Get the default cache directory path.
///
/// Uses platform-specific cache directories:
/// - Linux: `~/.cache/magic/`
/// - macOS: `~/Library/Caches/magic/`
/// - Windows: `%LOCALAPPDATA%\magic\`
pub(crate) fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("magic")
}

/// Get the default cache database path.
pub(crate) fn default_cache_path() -> PathBuf {
    default_cache_dir().join("magic.db")
}

/// Open the cache at `path`, creating the directory if needed.
pub(crate) fn open_cache_at(path: &Path) -> Result<SqliteCache, DataError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    SqliteCache::new(path)
}

/// Open the cache at its default location.
pub(crate) fn open_cache() -> Result<SqliteCache, DataError> {
    open_cache_at(&default_cache_path())
}

/// Render cache statistics for the terminal.
pub(crate) fn format_stats(path: &Path, stats: &CacheStats) -> String {
    let fmt_time = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map_or_else(
            || "-".to_string(),
            |t| t.format("%Y-%m-%d %H:%M UTC").to_string(),
        )
    };

    format!(
        "Cache location: {}\n  Financials: {} symbols\n  Prices: {} closes for {} symbols\n  Oldest entry: {}\n  Newest entry: {}",
        path.display(),
        stats.financials,
        stats.price_rows,
        stats.price_symbols,
        fmt_time(stats.oldest_entry),
        fmt_time(stats.newest_entry),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use magic_data::RawFinancials;

    #[test]
    fn test_default_path_is_named_after_app() {
        let path = default_cache_path();
        assert!(path.ends_with("magic/magic.db"));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.db");

        let cache = open_cache_at(&path).unwrap();
        cache.put_financials(&RawFinancials::new("IBM")).unwrap();
        assert!(path.exists());

        let text = format_stats(&path, &cache.get_stats().unwrap());
        assert!(text.contains("Financials: 1 symbols"));
        assert!(text.contains("Prices: 0 closes for 0 symbols"));
    }
}
