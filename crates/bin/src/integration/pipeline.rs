//! Provider construction for CLI commands.

use super::cache_manager;
use magic_data::DataProvider;
use magic_data::cache::{CachePolicy, CachedProvider};
use magic_data::error::DataError;
use magic_data::fmp::{FmpClient, FmpConfig};

/// How the CLI should fetch data.
#[derive(Debug, Clone, Default)]
pub(crate) struct FetchConfig {
    /// Explicit API key; falls back to the environment when absent.
    pub(crate) api_key: Option<String>,
    /// Override of the API base URL.
    pub(crate) base_url: Option<String>,
    /// Wrap the client in the SQLite cache.
    pub(crate) use_cache: bool,
    /// Ignore cached entries and refetch.
    pub(crate) force_refresh: bool,
    /// Freshness window for cached entries, in hours.
    pub(crate) max_age_hours: i64,
}

impl FetchConfig {
    fn client_config(&self) -> Result<FmpConfig, DataError> {
        let config = match &self.api_key {
            Some(key) if !key.trim().is_empty() => FmpConfig::new(key.trim()),
            _ => FmpConfig::from_env()?,
        };

        Ok(match &self.base_url {
            Some(url) => config.with_base_url(url.clone()),
            None => config,
        })
    }

    fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            max_age: chrono::Duration::hours(self.max_age_hours),
            force_refresh: self.force_refresh,
        }
    }
}

/// Build the data provider for a command.
pub(crate) fn build_provider(fetch: &FetchConfig) -> Result<Box<dyn DataProvider>, DataError> {
    let client = FmpClient::new(fetch.client_config()?)?;

    if !fetch.use_cache {
        tracing::debug!("cache disabled");
        return Ok(Box::new(client));
    }

    let cache = cache_manager::open_cache()?;
    tracing::debug!(
        path = %cache_manager::default_cache_path().display(),
        force_refresh = fetch.force_refresh,
        "using cache"
    );
    Ok(Box::new(CachedProvider::new(
        client,
        cache,
        fetch.cache_policy(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_key_wins() {
        let fetch = FetchConfig {
            api_key: Some("  abc123 ".to_string()),
            base_url: Some("http://localhost:9999/api/v3".to_string()),
            ..FetchConfig::default()
        };

        let config = fetch.client_config().unwrap();
        assert_eq!(config.api_key, "abc123");
        assert_eq!(config.base_url, "http://localhost:9999/api/v3");
    }

    #[test]
    fn test_cache_policy() {
        let fetch = FetchConfig {
            force_refresh: true,
            max_age_hours: 6,
            ..FetchConfig::default()
        };

        let policy = fetch.cache_policy();
        assert!(policy.force_refresh);
        assert_eq!(policy.max_age, chrono::Duration::hours(6));
    }

    #[test]
    fn test_uncached_provider_builds() {
        let fetch = FetchConfig {
            api_key: Some("key".to_string()),
            ..FetchConfig::default()
        };
        assert!(build_provider(&fetch).is_ok());
    }
}
