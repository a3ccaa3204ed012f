#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/magic/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod metrics;
pub mod rank;
pub mod returns;
pub mod screener;

pub use config::{DEFAULT_MAX_RESULTS, DEFAULT_MIN_MARKET_CAP, ScreenConfig};
pub use error::ScreenError;
pub use metrics::{DerivedMetrics, compute_metrics, round2};
pub use rank::{Candidate, RankedCandidate, fractional_rank_desc, rank_candidates};
pub use returns::{ReturnHorizon, ReturnMetrics, compute_returns, trailing_return};
pub use screener::{ScreenObserver, ScreenReport, ScreenStats, Screener, SymbolOutcome};
