//! Record file loading
//!
//! Financial records are read from CSV or a JSON array; the format is chosen
//! by file extension. Rows that cannot be parsed are rejected individually
//! and reported with their position, the rest of the file still loads.

pub mod csv;
pub mod json;

use std::fmt;
use std::path::Path;

use wbsync_reconcile::model::FinancialRecord;

use crate::error::{CliError, CliResult};

/// A row that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// Human-readable position, e.g. "line 4" or "record 2".
    pub location: String,
    pub message: String,
}

impl RejectedRow {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RejectedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Parsed contents of a records file.
#[derive(Debug, Default)]
pub struct RecordSet {
    pub records: Vec<FinancialRecord>,
    pub rejected: Vec<RejectedRow>,
}

impl RecordSet {
    /// Total rows seen, accepted or not.
    pub fn row_count(&self) -> usize {
        self.records.len() + self.rejected.len()
    }
}

/// Supported records file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Csv,
    Json,
}

impl RecordFormat {
    /// Detect the format from the file extension.
    pub fn from_path(path: &Path) -> CliResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(CliError::Validation(format!(
                "unsupported records file '{}': expected a .csv or .json extension",
                path.display()
            ))),
        }
    }
}

/// Load records from `path`.
pub fn load_records(path: &Path) -> CliResult<RecordSet> {
    let format = RecordFormat::from_path(path)?;
    let set = match format {
        RecordFormat::Csv => {
            let file = std::fs::File::open(path)?;
            csv::parse_records(file)?
        }
        RecordFormat::Json => {
            let content = std::fs::read_to_string(path)?;
            json::parse_records(&content)?
        }
    };

    tracing::debug!(
        path = %path.display(),
        ?format,
        accepted = set.records.len(),
        rejected = set.rejected.len(),
        "Loaded records file"
    );
    Ok(set)
}
