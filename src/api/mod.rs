//! Where transaction rows come from.
//!
//! Every source reduces to the same thing: a table of trimmed-or-not cell strings whose first row
//! is the header. The loader does the rest.

mod csv_file;
mod google_sheet;
mod memory;

pub use csv_file::CsvFile;
pub use google_sheet::{export_url, GoogleSheet};
pub use memory::{InMemory, DEMO_DATA, TEMPLATE_DATA};

use crate::error::LoadError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::{debug, warn};

/// The environment variable that switches the program into `Mode::Test`.
pub const TEST_MODE_ENV: &str = "FINDASH_IN_TEST_MODE";

/// A provider of raw rows.
#[async_trait::async_trait]
pub trait Source: Send {
    /// A name for messages, e.g. the file path or the sheet URL.
    fn name(&self) -> &str;

    /// Reads all rows, header first. This is a single fetch with no partial results.
    async fn rows(&mut self) -> Result<Vec<Vec<String>>>;
}

/// Whether Google Sheets are really fetched, or replaced by the in-memory demo sheet so that the
/// program can be run end-to-end without network access.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Google,
    Test,
}

serde_plain::derive_display_from_serialize!(Mode);
serde_plain::derive_fromstr_from_deserialize!(Mode);

impl Mode {
    /// `Mode::Test` when `FINDASH_IN_TEST_MODE` is set and non-empty.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Google,
        }
    }
}

/// Creates the source for a Google sheet URL according to `mode`.
pub fn sheet(sheet_url: &str, mode: Mode, max_bytes: u64) -> Result<Box<dyn Source>> {
    debug!("Creating a sheet source for {sheet_url} in {mode} mode");
    match mode {
        Mode::Google => Ok(Box::new(GoogleSheet::new(sheet_url, max_bytes)?)),
        Mode::Test => Ok(Box::new(InMemory::demo().with_name(sheet_url))),
    }
}

/// Splits CSV bytes into rows of cells. The header is returned as the first row and rows may have
/// differing lengths.
///
/// The header must be UTF-8. Invalid bytes in a data row are replaced with U+FFFD so that one
/// Latin-1 cell does not cost the whole file.
pub(crate) fn csv_rows(name: &str, bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(bytes));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.byte_records() {
        let record = result.map_err(|e| {
            LoadError::Schema(format!("Unable to read '{name}' as CSV: {e}"))
        })?;
        if rows.is_empty() {
            let header = record
                .iter()
                .map(|field| std::str::from_utf8(field).map(str::to_string))
                .collect::<std::result::Result<Vec<String>, _>>()
                .map_err(|_| {
                    LoadError::Schema(format!("The header of '{name}' is not valid UTF-8"))
                })?;
            rows.push(header);
            continue;
        }
        if std::str::from_utf8(record.as_slice()).is_err() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            warn!("Line {line} of '{name}' is not valid UTF-8, invalid bytes were replaced");
        }
        rows.push(
            record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect(),
        );
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_rows_flexible() {
        let rows = csv_rows("t", b"Month,Type,Category,Amount\nJan2025,Income\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["Month", "Type", "Category", "Amount"]);
        assert_eq!(rows[1], vec!["Jan2025", "Income"]);
    }

    #[test]
    fn test_csv_rows_quoted_commas() {
        let rows = csv_rows("t", b"Amount\n\"-$1,200.00\"\n").unwrap();
        assert_eq!(rows[1], vec!["-$1,200.00"]);
    }

    #[test]
    fn test_csv_rows_invalid_utf8_header_is_schema_error() {
        let err = csv_rows("t", b"Mon\xffth\nJan2025\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::Schema(_))
        ));
    }

    #[test]
    fn test_csv_rows_invalid_utf8_cell_is_replaced() {
        let csv = b"Month,Type,Category,Amount\n\
                    Jan2025,Income,Salary,5000\n\
                    Jan2025,Variable,Caf\xe9,-4\n";
        let rows = csv_rows("t", csv).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["Jan2025", "Income", "Salary", "5000"]);
        assert_eq!(rows[2][2], "Caf\u{FFFD}");
        assert_eq!(rows[2][3], "-4");
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Test.to_string(), "test");
        assert_eq!("google".parse::<Mode>().unwrap(), Mode::Google);
    }

    #[tokio::test]
    async fn test_sheet_in_test_mode_is_demo() {
        let mut source = sheet("https://example.com/sheet", Mode::Test, 1024).unwrap();
        assert_eq!(source.name(), "https://example.com/sheet");
        let rows = source.rows().await.unwrap();
        assert_eq!(rows[0][0], "Month");
    }
}
