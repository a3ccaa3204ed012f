//! Caching layer for provider data.

pub mod provider;
pub mod sqlite;

pub use provider::{CachePolicy, CachedProvider, DEFAULT_MAX_AGE_HOURS};
pub use sqlite::{CacheStats, SqliteCache};
