//! Financial Modeling Prep data provider.

pub mod client;
pub mod types;

pub use client::{API_KEY_ENV, FMP_BASE_URL, FmpClient, FmpConfig};
