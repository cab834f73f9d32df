pub mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod loader;
pub mod model;
pub mod report;
mod utils;


pub use api::{Mode, Source};
pub use config::{Config, DEFAULT_SHEET_URL};
pub use error::{Error, LoadError, Result, RowError, RowErrorKind};
pub use loader::{load, load_with_fallback, DataSource, LoadReport, Loaded};
pub use report::{Filter, SummaryReport};
