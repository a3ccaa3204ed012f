//! Stock universe selection.

use crate::error::DataError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The set of symbols a screening run starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UniverseSelector {
    /// Broad market index constituents (S&P 500)
    #[default]
    BroadIndex,

    /// Large-cap blue chips (Dow Jones Industrial Average)
    LargeCap,

    /// Every actively traded common stock
    AllTradable,
}

impl UniverseSelector {
    /// Returns all selectors.
    pub const fn all() -> [Self; 3] {
        [Self::BroadIndex, Self::LargeCap, Self::AllTradable]
    }

    /// Returns the command-line identifier.
    pub const fn id(&self) -> &'static str {
        match self {
            Self::BroadIndex => "broad-index",
            Self::LargeCap => "large-cap",
            Self::AllTradable => "all-tradable",
        }
    }

    /// Returns a human-readable description.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::BroadIndex => "S&P 500 constituents",
            Self::LargeCap => "Dow Jones Industrial Average constituents",
            Self::AllTradable => "All actively traded stocks",
        }
    }
}

impl fmt::Display for UniverseSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for UniverseSelector {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");

        match normalized.as_str() {
            "broad-index" | "sp500" | "s&p500" | "broad" => Ok(Self::BroadIndex),
            "large-cap" | "dow" | "dow30" | "largecap" => Ok(Self::LargeCap),
            "all-tradable" | "all" | "tradable" => Ok(Self::AllTradable),
            _ => Err(DataError::InvalidUniverse(s.to_string())),
        }
    }
}
