#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/magic/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod error;
pub mod fmp;
pub mod memory;
pub mod provider;
pub mod types;
pub mod universe;

pub use error::{DataError, Result};
pub use memory::InMemoryProvider;
pub use provider::DataProvider;
pub use types::{PricePoint, RawFinancials};
pub use universe::UniverseSelector;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
