//! Error types used across findash.
//!
//! Application plumbing uses `anyhow`. The loader raises a typed `LoadError` for failures that
//! abort a load, and collects `RowError`s for individual rows that could not be parsed. Both can
//! be recovered from an `anyhow::Error` with `downcast_ref`.

use serde::Serialize;
use thiserror::Error;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort a load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file or sheet could not be reached or read.
    #[error("The data source '{name}' is unavailable: {reason}")]
    SourceUnavailable { name: String, reason: String },

    /// The file is larger than the configured limit.
    #[error("The data source '{name}' is {size} bytes which exceeds the limit of {limit} bytes")]
    SourceTooLarge { name: String, size: u64, limit: u64 },

    /// The file is of a kind that cannot be read, e.g. an Excel workbook.
    #[error("Unsupported file format '{0}', please provide a CSV file")]
    UnsupportedFormat(String),

    /// The header is missing, or required columns are missing or duplicated.
    #[error("File format error: {0}")]
    Schema(String),
}

impl LoadError {
    pub(crate) fn unavailable(name: impl Into<String>, reason: impl ToString) -> Self {
        LoadError::SourceUnavailable {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

/// A data row that was rejected by the loader. `line` is the 1-based line in the source,
/// counting the header as line 1.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Error)]
#[error("Row {line}: {kind}")]
pub struct RowError {
    pub line: usize,
    pub kind: RowErrorKind,
}

impl RowError {
    pub(crate) fn new(line: usize, kind: RowErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowErrorKind {
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("amount '{value}' is not a number")]
    InvalidAmount { value: String },

    #[error("budget '{value}' is not a number")]
    InvalidBudget { value: String },

    #[error("month '{value}' is not recognized: {reason}")]
    InvalidMonth { value: String, reason: String },
}
