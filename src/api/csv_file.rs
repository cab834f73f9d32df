//! Implements `Source` for a CSV file on disk.

use crate::api::{csv_rows, Source};
use crate::error::LoadError;
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::trace;

/// A local CSV file, such as one a user exported from a spreadsheet.
pub struct CsvFile {
    path: PathBuf,
    name: String,
    max_bytes: u64,
}

impl CsvFile {
    pub fn new(path: impl Into<PathBuf>, max_bytes: u64) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            path,
            max_bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl Source for CsvFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn rows(&mut self) -> Result<Vec<Vec<String>>> {
        trace!("Reading rows from {}", self.name);
        if let Some(ext) = self.path.extension().and_then(|e| e.to_str()) {
            if ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xls") {
                return Err(LoadError::UnsupportedFormat(ext.to_string()).into());
            }
        }

        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| LoadError::unavailable(&self.name, e))?;
        if !metadata.is_file() {
            return Err(LoadError::unavailable(&self.name, "not a file").into());
        }
        if metadata.len() > self.max_bytes {
            return Err(LoadError::SourceTooLarge {
                name: self.name.clone(),
                size: metadata.len(),
                limit: self.max_bytes,
            }
            .into());
        }

        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| LoadError::unavailable(&self.name, e))?;
        csv_rows(&self.name, &bytes)
    }
}
