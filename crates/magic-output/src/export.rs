//! CSV and JSON export of screening results.

use magic_screen::RankedCandidate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized output was not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Infer the format from a file extension (`.json` is pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidFormat`] for unknown or missing extensions.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::PrettyJson),
            _ => Err(ExportError::InvalidFormat(format!(
                "cannot infer export format from {}",
                path.display()
            ))),
        }
    }
}

/// One row of the ranked output.
///
/// Absent returns serialize as empty CSV cells and JSON `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScreenResultRecord {
    /// Position in the ranked list (1 = best).
    pub rank: usize,
    /// Ticker symbol.
    pub symbol: String,
    /// Company name.
    pub name: String,
    /// Sector.
    pub sector: String,
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// Earnings yield, percent.
    pub earnings_yield: f64,
    /// Return on capital, percent.
    pub return_on_capital: f64,
    /// One-day return, percent.
    pub return_1d: Option<f64>,
    /// One-month return, percent.
    pub return_1m: Option<f64>,
    /// One-year return, percent.
    pub return_1y: Option<f64>,
    /// Earnings yield rank.
    pub ey_rank: f64,
    /// Return on capital rank.
    pub roc_rank: f64,
    /// Sum of both ranks.
    pub combined_rank: f64,
}

impl ScreenResultRecord {
    /// Build a record from a ranked candidate at a 1-based position.
    pub fn from_candidate(rank: usize, candidate: &RankedCandidate) -> Self {
        let financials = &candidate.metrics.financials;
        Self {
            rank,
            symbol: financials.symbol.clone(),
            name: financials.name.clone(),
            sector: financials.sector.clone(),
            market_cap: financials.market_cap,
            earnings_yield: candidate.metrics.earnings_yield,
            return_on_capital: candidate.metrics.return_on_capital,
            return_1d: candidate.returns.return_1d,
            return_1m: candidate.returns.return_1m,
            return_1y: candidate.returns.return_1y,
            ey_rank: candidate.ey_rank,
            roc_rank: candidate.roc_rank,
            combined_rank: candidate.combined_rank,
        }
    }

    /// Build records for an ordered candidate list.
    pub fn from_candidates(candidates: &[RankedCandidate]) -> Vec<Self> {
        candidates
            .iter()
            .enumerate()
            .map(|(i, c)| Self::from_candidate(i + 1, c))
            .collect()
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for ScreenResultRecord {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        std::slice::from_ref(self).export_to_string(format)
    }
}

impl Exporter for [ScreenResultRecord] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                if self.is_empty() {
                    wtr.write_record(CSV_HEADER)?;
                }
                for record in self {
                    wtr.serialize(record)?;
                }
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                Ok(String::from_utf8(bytes)?)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for Vec<ScreenResultRecord> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        self.as_slice().export_to_string(format)
    }
}

impl Exporter for [RankedCandidate] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        ScreenResultRecord::from_candidates(self).export_to_string(format)
    }
}

impl Exporter for Vec<RankedCandidate> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        self.as_slice().export_to_string(format)
    }
}

/// Column order of the CSV output, written even when there are no rows.
const CSV_HEADER: [&str; 13] = [
    "rank",
    "symbol",
    "name",
    "sector",
    "market_cap",
    "earnings_yield",
    "return_on_capital",
    "return_1d",
    "return_1m",
    "return_1y",
    "ey_rank",
    "roc_rank",
    "combined_rank",
];
