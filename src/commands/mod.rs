//! Command handlers for the findash CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod init;
mod summary;
mod template;
mod transactions;

use crate::api::{self, CsvFile, InMemory, Mode, Source};
use crate::args::{OutputFormat, SourceArgs};
use crate::loader::{self, load_with_fallback, DataSource, Loaded};
use crate::{Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info, warn};

pub use init::init;
pub use summary::{summary, SummaryOut};
pub use template::template;
pub use transactions::{transactions, TransactionsOut};

/// The output type for a command. This allows the command to return a consistent message, a
/// human-readable body and, optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// What is printed to stdout in `OutputFormat::Text`.
    #[serde(skip)]
    body: Option<String>,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            body: None,
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            body: None,
            structure: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Logs the message with `info!`, then prints the body (`Text`) or the structured data as
    /// JSON (`Json`) to stdout.
    ///
    /// # Errors
    /// Returns an error if the structured data cannot be serialized.
    pub fn print(&self, format: OutputFormat) -> Result<()> {
        info!("{}", self.message);
        match format {
            OutputFormat::Text => {
                if let Some(body) = self.body() {
                    print!("{body}");
                }
            }
            OutputFormat::Json => {
                if let Some(structure) = self.structure() {
                    let json = serde_json::to_string_pretty(structure)
                        .context("Unable to serialize the command output")?;
                    println!("{json}");
                }
            }
        }
        Ok(())
    }
}

/// Loads transactions from the source that `args` selects.
///
/// - `--demo`: the built-in demo data.
/// - `--fallback`: the `--csv` file if given, then the sheet, then the demo data. Failures are
///   logged and skipped.
/// - otherwise: the `--csv` file if given, else the sheet. Failures are returned.
///
/// The sheet is `--sheet-url` if given, else the one in config.json.
pub(crate) async fn load(config: &Config, mode: Mode, args: &SourceArgs) -> Result<Loaded> {
    let limits = config.limits();
    if args.demo() {
        let mut demo = InMemory::demo();
        let report = loader::load(&mut demo, &limits).await?;
        return Ok(Loaded {
            data_source: DataSource::Demo,
            name: demo.name().to_string(),
            report,
        });
    }

    let sheet_url = args.sheet_url().unwrap_or(config.sheet_url());
    let file: Option<Box<dyn Source>> = args
        .csv()
        .map(|path| Box::new(CsvFile::new(path, limits.max_file_bytes)) as Box<dyn Source>);

    if args.fallback() {
        let sheet = match api::sheet(sheet_url, mode, limits.max_file_bytes) {
            Ok(sheet) => Some(sheet),
            Err(e) => {
                warn!("Skipping the sheet: {e:#}");
                None
            }
        };
        return load_with_fallback(file, sheet, &limits).await;
    }

    let (data_source, mut source) = match file {
        Some(file) => (DataSource::Uploaded, file),
        None => (
            DataSource::GoogleSheets,
            api::sheet(sheet_url, mode, limits.max_file_bytes)?,
        ),
    };
    debug!("Loading {data_source} data from {}", source.name());
    let report = loader::load(source.as_mut(), &limits)
        .await
        .with_context(|| format!("Unable to load transactions from '{}'", source.name()))?;
    Ok(Loaded {
        data_source,
        name: source.name().to_string(),
        report,
    })
}

/// Logs the rows that were left out or look suspicious.
pub(crate) fn log_problems(loaded: &Loaded) {
    for rejected in loaded.report.rejected() {
        warn!("Skipped {rejected}");
    }
    if loaded.data_source == DataSource::Demo {
        info!("Showing demo data");
    }
}
