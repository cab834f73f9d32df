//! These structs provide the CLI interface for the findash CLI.

use crate::model::{MonthKey, TransactionType};
use crate::report::Filter;
use crate::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing::level_filters::LevelFilter;

/// findash: A personal finance dashboard for the command line.
///
/// Reads your income and expense transactions from a CSV file or a public Google sheet and shows
/// totals, your balance and savings rate, where the money went, and how each month compares.
///
/// The data needs the columns Month, Type, Category and Amount. Run `findash template` to get a
/// file to start from.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the findash home directory and its config.json.
    ///
    /// This is optional. Without a config file, findash reads the public sample sheet when asked
    /// for a sheet.
    Init(InitArgs),
    /// Show the totals, savings rate and breakdowns for the selected transactions.
    Summary(SummaryArgs),
    /// List the selected transactions, or write them to a CSV file.
    Transactions(TransactionsArgs),
    /// Write a sample CSV file with the expected columns.
    Template(TemplateArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the findash configuration is held. Defaults to ~/findash
    #[arg(long, env = "FINDASH_HOME", default_value_t = default_findash_home())]
    findash_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, findash_home: PathBuf) -> Self {
        Self {
            log_level,
            findash_home: findash_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn findash_home(&self) -> &DisplayPath {
        &self.findash_home
    }
}

/// (Not shown): Args for the `findash init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL of your Google sheet. It must be shared with "anyone with the link". It looks
    /// like this: https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    #[arg(long)]
    sheet_url: String,
}

impl InitArgs {
    pub fn new(sheet_url: impl Into<String>) -> Self {
        Self {
            sheet_url: sheet_url.into(),
        }
    }

    pub fn sheet_url(&self) -> &str {
        &self.sheet_url
    }
}

/// Where to read transactions from.
///
/// With no options the configured Google sheet is read. With `--fallback`, the file is tried,
/// then the sheet, then the built-in demo data.
#[derive(Debug, Parser, Clone, Default)]
pub struct SourceArgs {
    /// A CSV file of transactions.
    #[arg(long, conflicts_with = "demo")]
    csv: Option<PathBuf>,

    /// A Google sheet URL, overriding the one in config.json.
    #[arg(long, env = "FINDASH_SHEET_URL")]
    sheet_url: Option<String>,

    /// Use the built-in demo data.
    #[arg(long)]
    demo: bool,

    /// Instead of failing when a source cannot be loaded, move on to the next one.
    #[arg(long)]
    fallback: bool,
}

impl SourceArgs {
    pub fn new(
        csv: Option<PathBuf>,
        sheet_url: Option<String>,
        demo: bool,
        fallback: bool,
    ) -> Self {
        Self {
            csv,
            sheet_url,
            demo,
            fallback,
        }
    }

    pub fn csv(&self) -> Option<&Path> {
        self.csv.as_deref()
    }

    pub fn sheet_url(&self) -> Option<&str> {
        self.sheet_url.as_deref()
    }

    pub fn demo(&self) -> bool {
        self.demo
    }

    pub fn fallback(&self) -> bool {
        self.fallback
    }
}

/// Which transactions to include.
#[derive(Debug, Parser, Clone, Default)]
pub struct FilterArgs {
    /// Only this month, e.g. 2025-01 or January2025. Can be repeated.
    #[arg(long = "month")]
    months: Vec<MonthKey>,

    /// The first month to include.
    #[arg(long)]
    from: Option<MonthKey>,

    /// The last month to include.
    #[arg(long)]
    to: Option<MonthKey>,

    /// Only this category. Can be repeated.
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Only this type, e.g. Income, Fixed or Variable. Can be repeated.
    #[arg(long = "type")]
    types: Vec<String>,
}

impl FilterArgs {
    pub fn new(
        months: Vec<MonthKey>,
        from: Option<MonthKey>,
        to: Option<MonthKey>,
        categories: Vec<String>,
        types: Vec<String>,
    ) -> Self {
        Self {
            months,
            from,
            to,
            categories,
            types,
        }
    }

    /// Builds the `Filter`. Criteria that were not given on the command line match everything.
    ///
    /// # Errors
    /// Returns an error if `--from` is after `--to`.
    pub fn to_filter(&self) -> Result<Filter> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            anyhow::ensure!(from <= to, "--from {from} is after --to {to}");
        }
        let mut filter = Filter::all().with_range(self.from, self.to);
        if !self.months.is_empty() {
            filter = filter.with_months(self.months.iter().copied());
        }
        if !self.categories.is_empty() {
            filter = filter.with_categories(self.categories.iter().map(|c| c.trim().to_string()));
        }
        if !self.types.is_empty() {
            filter = filter.with_types(self.types.iter().map(|t| {
                match TransactionType::from_str(t.trim()) {
                    Ok(t) => t,
                    Err(never) => match never {},
                }
            }));
        }
        Ok(filter)
    }
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable tables.
    #[default]
    Text,
    /// The full report as JSON.
    Json,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// (Not shown): Args for the `findash summary` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct SummaryArgs {
    #[clap(flatten)]
    source: SourceArgs,

    #[clap(flatten)]
    filter: FilterArgs,

    /// How to print the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl SummaryArgs {
    pub fn new(source: SourceArgs, filter: FilterArgs, format: OutputFormat) -> Self {
        Self {
            source,
            filter,
            format,
        }
    }

    pub fn source(&self) -> &SourceArgs {
        &self.source
    }

    pub fn filter(&self) -> &FilterArgs {
        &self.filter
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// (Not shown): Args for the `findash transactions` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct TransactionsArgs {
    #[clap(flatten)]
    source: SourceArgs,

    #[clap(flatten)]
    filter: FilterArgs,

    /// Show every transaction instead of the first 10.
    #[arg(long)]
    all: bool,

    /// Write the selected transactions to this CSV file.
    #[arg(long)]
    out: Option<PathBuf>,

    /// How to print the transactions.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl TransactionsArgs {
    pub fn new(
        source: SourceArgs,
        filter: FilterArgs,
        all: bool,
        out: Option<PathBuf>,
        format: OutputFormat,
    ) -> Self {
        Self {
            source,
            filter,
            all,
            out,
            format,
        }
    }

    pub fn source(&self) -> &SourceArgs {
        &self.source
    }

    pub fn filter(&self) -> &FilterArgs {
        &self.filter
    }

    pub fn all(&self) -> bool {
        self.all
    }

    pub fn out(&self) -> Option<&Path> {
        self.out.as_deref()
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// (Not shown): Args for the `findash template` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct TemplateArgs {
    /// Where to write the template. Printed to stdout if omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

impl TemplateArgs {
    pub fn new(out: Option<PathBuf>) -> Self {
        Self { out }
    }

    pub fn out(&self) -> Option<&Path> {
        self.out.as_deref()
    }
}

fn default_findash_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("findash"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --findash-home or FINDASH_HOME instead of relying on the \
                default findash home directory.",
            );
            PathBuf::from("findash")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["findash", "--findash-home", "/tmp/findash-test"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_summary() {
        let args = parse(&[
            "summary",
            "--csv",
            "data.csv",
            "--month",
            "2025-01",
            "--month",
            "February2025",
            "--type",
            "Variable",
            "--format",
            "json",
        ]);
        let Command::Summary(summary) = args.command() else {
            panic!("expected summary");
        };
        assert_eq!(summary.source().csv(), Some(Path::new("data.csv")));
        assert!(!summary.source().fallback());
        assert_eq!(summary.format(), OutputFormat::Json);
        let filter = summary.filter().to_filter().unwrap();
        let expected = Filter::all()
            .with_months([MonthKey::new(2025, 1).unwrap(), MonthKey::new(2025, 2).unwrap()])
            .with_types([TransactionType::Variable]);
        assert_eq!(filter, expected);
    }

    #[test]
    fn test_parse_bad_month() {
        let result = Args::try_parse_from(["findash", "summary", "--month", "Smarch2025"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_csv_conflicts_with_demo() {
        let result = Args::try_parse_from(["findash", "summary", "--csv", "a.csv", "--demo"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_after_to() {
        let args = FilterArgs::new(
            Vec::new(),
            MonthKey::new(2025, 3).ok(),
            MonthKey::new(2025, 1).ok(),
            Vec::new(),
            Vec::new(),
        );
        assert!(args.to_filter().is_err());
    }

    #[test]
    fn test_empty_filter_args_match_all() {
        assert!(FilterArgs::default().to_filter().unwrap().is_all());
    }

    #[test]
    fn test_common() {
        let args = parse(&["template"]);
        assert_eq!(args.common().log_level(), LevelFilter::INFO);
        assert_eq!(
            args.common().findash_home().path(),
            Path::new("/tmp/findash-test")
        );
    }
}
