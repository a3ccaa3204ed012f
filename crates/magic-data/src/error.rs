//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Provider rejected the request with an unexpected status
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or summary
        message: String,
    },

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Symbol unknown to the provider
    #[error("No data found for {0}")]
    NotFound(String),

    /// Missing data
    #[error("Missing data for {symbol}: {reason}")]
    MissingData {
        /// Symbol that was queried
        symbol: String,
        /// Reason for missing data
        reason: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rate limit error
    #[error("Rate limit exceeded, please retry after {retry_after_ms}ms")]
    RateLimit {
        /// Milliseconds to wait before retrying
        retry_after_ms: u64,
    },

    /// Invalid symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Unknown universe selector
    #[error("Unknown universe: {0}")]
    InvalidUniverse(String),

    /// Provider configuration error (missing or rejected API key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Whether the failure is confined to a single symbol.
    ///
    /// Configuration and rate-limit errors affect every subsequent request.
    pub const fn is_symbol_scoped(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::MissingData { .. }
                | Self::InvalidSymbol(_)
                | Self::Parse(_)
                | Self::Api { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_scoped() {
        assert!(DataError::NotFound("AAPL".to_string()).is_symbol_scoped());
        assert!(!DataError::Config("missing key".to_string()).is_symbol_scoped());
        assert!(
            !DataError::RateLimit {
                retry_after_ms: 1000
            }
            .is_symbol_scoped()
        );
    }

    #[test]
    fn test_display() {
        let err = DataError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 500): boom");
    }
}
