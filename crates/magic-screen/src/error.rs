//! Error types for screening.

use magic_data::DataError;
use thiserror::Error;

/// Errors raised by the screening pipeline.
///
/// Only [`ScreenError::Universe`] and [`ScreenError::InvalidConfig`] abort a
/// run; [`ScreenError::MissingField`] is reported per symbol and removes that
/// symbol from the candidate set.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// The initial symbol list could not be obtained
    #[error("Failed to load universe: {0}")]
    Universe(#[from] DataError),

    /// A required raw attribute is absent or not a finite number
    #[error("Missing field {field} for {symbol}")]
    MissingField {
        /// Symbol being evaluated
        symbol: String,
        /// Name of the missing attribute
        field: &'static str,
    },

    /// Screening parameters are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
