//! Turns raw rows from a `Source` into `Transactions`.
//!
//! A load either fails as a whole with a `LoadError` (the source cannot be read, or the header is
//! wrong) or succeeds with a `LoadReport`. Rows that cannot be parsed do not fail the load; they
//! are listed in `LoadReport::rejected` and left out of the transactions.

use crate::api::{InMemory, Source};
use crate::error::{LoadError, RowError, RowErrorKind};
use crate::model::mapping::{Mapping, AMOUNT_STR, CATEGORY_STR, MONTH_STR, TYPE_STR};
use crate::model::{Amount, MonthKey, Transaction, TransactionType, Transactions};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Files larger than this are refused.
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Data rows beyond this are dropped.
pub const MAX_ROWS: usize = 10_000;

/// Guards against loading more than a dashboard can sensibly show.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Limits {
    pub max_file_bytes: u64,
    pub max_rows: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_bytes: MAX_FILE_BYTES,
            max_rows: MAX_ROWS,
        }
    }
}

/// Which source the transactions of a fallback load came from.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// The user's own file.
    Uploaded,
    GoogleSheets,
    /// The built-in demo dataset.
    Demo,
}

serde_plain::derive_display_from_serialize!(DataSource);
serde_plain::derive_fromstr_from_deserialize!(DataSource);

/// A data-quality finding about a row that was kept.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataWarning {
    /// The amount's sign contradicts the type, e.g. a positive `Fixed` row.
    SignMismatch {
        line: usize,
        transaction_type: TransactionType,
        amount: Amount,
    },
}

impl Display for DataWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DataWarning::SignMismatch {
                line,
                transaction_type,
                amount,
            } => write!(
                f,
                "Row {line}: a {transaction_type} amount of {amount} has an unexpected sign"
            ),
        }
    }
}

/// The outcome of a successful load.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct LoadReport {
    transactions: Transactions,
    rejected: Vec<RowError>,
    warnings: Vec<DataWarning>,
    /// The number of data rows dropped because of `Limits::max_rows`.
    truncated_rows: usize,
}

impl LoadReport {
    pub fn transactions(&self) -> &Transactions {
        &self.transactions
    }

    pub fn into_transactions(self) -> Transactions {
        self.transactions
    }

    pub fn rejected(&self) -> &[RowError] {
        &self.rejected
    }

    pub fn warnings(&self) -> &[DataWarning] {
        &self.warnings
    }

    pub fn truncated_rows(&self) -> usize {
        self.truncated_rows
    }
}

/// A `LoadReport` together with where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct Loaded {
    pub data_source: DataSource,
    pub name: String,
    pub report: LoadReport,
}

/// Parses rows, header first, into a `LoadReport`.
///
/// # Errors
/// `LoadError::Schema` if there is no header row or the header lacks a required column.
pub fn parse_rows(
    rows: Vec<Vec<String>>,
    max_rows: usize,
) -> std::result::Result<LoadReport, LoadError> {
    let mut rows = rows.into_iter();
    let mapping = match rows.next() {
        Some(header) => Mapping::new(&header)?,
        None => return Err(LoadError::Schema(String::from("The file is empty"))),
    };

    let mut report = LoadReport::default();
    let mut data = Vec::new();
    let mut kept_rows = 0usize;
    for (ix, row) in rows.enumerate() {
        let line = ix + 2;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        if kept_rows == max_rows {
            report.truncated_rows += 1;
            continue;
        }
        kept_rows += 1;

        match parse_row(&mapping, &row, line) {
            Ok(transaction) => {
                if !transaction.sign_is_consistent() {
                    let warning = DataWarning::SignMismatch {
                        line,
                        transaction_type: transaction.transaction_type().clone(),
                        amount: transaction.amount(),
                    };
                    warn!("{warning}");
                    report.warnings.push(warning);
                }
                data.push(transaction);
            }
            Err(e) => {
                debug!("Rejected {e}");
                report.rejected.push(e);
            }
        }
    }

    if report.truncated_rows > 0 {
        warn!(
            "The data has more than {max_rows} rows, {} rows were not loaded",
            report.truncated_rows
        );
    }
    report.transactions = Transactions::new(data).with_budget_column(mapping.has_budget());
    Ok(report)
}

fn parse_row(
    mapping: &Mapping,
    row: &[String],
    line: usize,
) -> std::result::Result<Transaction, RowError> {
    let missing = |field: &str| {
        RowError::new(
            line,
            RowErrorKind::MissingField {
                field: field.to_string(),
            },
        )
    };

    let month_text = mapping.month(row);
    let type_text = mapping.transaction_type(row);
    let category = mapping.category(row);
    let amount_text = mapping.amount(row);
    for (field, value) in [
        (MONTH_STR, month_text),
        (TYPE_STR, type_text),
        (CATEGORY_STR, category),
        (AMOUNT_STR, amount_text),
    ] {
        if value.is_empty() {
            return Err(missing(field));
        }
    }

    let month = MonthKey::from_str(month_text).map_err(|e| {
        RowError::new(
            line,
            RowErrorKind::InvalidMonth {
                value: month_text.to_string(),
                reason: e.to_string(),
            },
        )
    })?;

    let amount = Amount::from_str(amount_text).map_err(|_| {
        RowError::new(
            line,
            RowErrorKind::InvalidAmount {
                value: amount_text.to_string(),
            },
        )
    })?;

    let budget_text = mapping.budget(row);
    let budget = if budget_text.is_empty() {
        None
    } else {
        Some(Amount::from_str(budget_text).map_err(|_| {
            RowError::new(
                line,
                RowErrorKind::InvalidBudget {
                    value: budget_text.to_string(),
                },
            )
        })?)
    };

    let transaction_type = match TransactionType::from_str(type_text) {
        Ok(t) => t,
        Err(never) => match never {},
    };
    Ok(Transaction::new(month, transaction_type, category, amount)
        .with_month_label(month_text)
        .with_description(mapping.description(row))
        .with_budget(budget))
}

/// Reads `source` and parses its rows.
///
/// # Errors
/// Any error of the source, or `LoadError::Schema`.
pub async fn load(source: &mut dyn Source, limits: &Limits) -> Result<LoadReport> {
    let rows = source.rows().await?;
    debug!("Read {} rows from {}", rows.len(), source.name());
    let report = parse_rows(rows, limits.max_rows)?;
    info!(
        "Loaded {} transactions from {} ({} rows rejected)",
        report.transactions.len(),
        source.name(),
        report.rejected.len()
    );
    Ok(report)
}

/// Loads the user's file if there is one, otherwise the Google sheet, otherwise the demo data.
///
/// A source that fails, or yields no transactions, is passed over with a warning. The demo data
/// always loads, so this only fails if the built-in data is broken.
pub async fn load_with_fallback(
    file: Option<Box<dyn Source>>,
    sheet: Option<Box<dyn Source>>,
    limits: &Limits,
) -> Result<Loaded> {
    let candidates = [
        (DataSource::Uploaded, file),
        (DataSource::GoogleSheets, sheet),
    ];
    for (data_source, source) in candidates {
        let Some(mut source) = source else {
            continue;
        };
        match load(source.as_mut(), limits).await {
            Ok(report) if !report.transactions.is_empty() => {
                return Ok(Loaded {
                    data_source,
                    name: source.name().to_string(),
                    report,
                });
            }
            Ok(_) => warn!(
                "{} contained no usable transactions, trying the next source",
                source.name()
            ),
            Err(e) => warn!("Unable to load {}: {e:#}", source.name()),
        }
    }

    warn!("Using demo data");
    let mut demo = InMemory::demo();
    let report = load(&mut demo, limits).await?;
    Ok(Loaded {
        data_source: DataSource::Demo,
        name: demo.name().to_string(),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CsvFile;
    use crate::test::{rows, write_csv, JANUARY_CSV};
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    #[test]
    fn test_parse_rows_basic() {
        let report = parse_rows(rows(JANUARY_CSV), MAX_ROWS).unwrap();
        assert_eq!(report.transactions().len(), 3);
        assert!(report.rejected().is_empty());
        assert!(report.warnings().is_empty());
        let rent = &report.transactions().data()[1];
        assert_eq!(rent.month(), MonthKey::new(2025, 1).unwrap());
        assert_eq!(rent.month_label(), "January2025");
        assert_eq!(rent.transaction_type(), &TransactionType::Fixed);
        assert_eq!(rent.category(), "Rent");
        assert_eq!(rent.description(), "Rent");
        assert_eq!(rent.amount().value(), Decimal::from(-1200));
    }

    #[test]
    fn test_parse_rows_non_numeric_amount_is_rejected() {
        let csv = "Month,Type,Category,Amount\n\
                   January2025,Income,Salary,5000\n\
                   January2025,Variable,Food,abc\n";
        let report = parse_rows(rows(csv), MAX_ROWS).unwrap();
        assert_eq!(report.transactions().len(), 1);
        assert_eq!(
            report.rejected(),
            &[RowError::new(
                3,
                RowErrorKind::InvalidAmount {
                    value: "abc".into()
                }
            )]
        );
    }

    #[test]
    fn test_parse_rows_missing_fields() {
        let csv = "Month,Type,Category,Amount\n\
                   ,Income,Salary,5000\n\
                   January2025,Income,,5000\n\
                   January2025,Income,Salary\n";
        let report = parse_rows(rows(csv), MAX_ROWS).unwrap();
        assert!(report.transactions().is_empty());
        let fields: Vec<String> = report
            .rejected()
            .iter()
            .map(|e| match &e.kind {
                RowErrorKind::MissingField { field } => field.clone(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(fields, vec!["Month", "Category", "Amount"]);
    }

    #[test]
    fn test_parse_rows_bad_month() {
        let csv = "Month,Type,Category,Amount\nSmarch2025,Income,Salary,5000\n";
        let report = parse_rows(rows(csv), MAX_ROWS).unwrap();
        assert!(matches!(
            report.rejected()[0].kind,
            RowErrorKind::InvalidMonth { .. }
        ));
    }

    #[test]
    fn test_parse_rows_any_column_order_and_extras() {
        let csv = "Amount,Notes,Type,Month,Category,Budget\n\
                   \"-$1,200.00\",x,Fixed,Jan-25,Rent,-1250\n";
        let report = parse_rows(rows(csv), MAX_ROWS).unwrap();
        let t = &report.transactions().data()[0];
        assert_eq!(t.amount().value(), Decimal::from(-1200));
        assert_eq!(t.budget().unwrap().value(), Decimal::from(-1250));
        assert_eq!(t.month_label(), "Jan-25");
    }

    #[test]
    fn test_parse_rows_out_of_range_amounts_are_rejected() {
        let csv = "Month,Type,Category,Amount,Budget\n\
                   Jan2025,Income,Salary,79228162514264337593543950335,\n\
                   Jan2025,Income,Bonus,79228162514264337593543950335,\n\
                   Jan2025,Fixed,Rent,-1200,-79228162514264337593543950335\n\
                   Jan2025,Variable,Food,-300,\n";
        let report = parse_rows(rows(csv), MAX_ROWS).unwrap();
        assert_eq!(report.transactions().len(), 1);
        let kinds: Vec<&RowErrorKind> = report.rejected().iter().map(|e| &e.kind).collect();
        assert!(matches!(kinds[0], RowErrorKind::InvalidAmount { .. }));
        assert!(matches!(kinds[1], RowErrorKind::InvalidAmount { .. }));
        assert!(matches!(kinds[2], RowErrorKind::InvalidBudget { .. }));
    }

    #[test]
    fn test_parse_rows_records_budget_column() {
        let csv = "Month,Type,Category,Amount,Budget\nJan2025,Fixed,Rent,-1200,\n";
        let report = parse_rows(rows(csv), MAX_ROWS).unwrap();
        assert!(report.transactions().data()[0].budget().is_none());
        assert!(report.transactions().has_budget());
        let report = parse_rows(rows(JANUARY_CSV), MAX_ROWS).unwrap();
        assert!(!report.transactions().has_budget());
    }

    #[tokio::test]
    async fn test_load_keeps_rows_around_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin1.csv");
        std::fs::write(
            &path,
            b"Month,Type,Category,Amount\nJan2025,Income,Salary,5000\nJan2025,Variable,Caf\xe9,-4\n",
        )
        .unwrap();
        let mut source = CsvFile::new(&path, MAX_FILE_BYTES);
        let report = load(&mut source, &Limits::default()).await.unwrap();
        assert_eq!(report.transactions().len(), 2);
        assert_eq!(report.transactions().data()[0].category(), "Salary");
        assert_eq!(report.transactions().data()[1].category(), "Caf\u{FFFD}");
    }

    #[test]
    fn test_parse_rows_bad_budget() {
        let csv = "Month,Type,Category,Amount,Budget\nJan2025,Fixed,Rent,-1200,lots\n";
        let report = parse_rows(rows(csv), MAX_ROWS).unwrap();
        assert!(matches!(
            report.rejected()[0].kind,
            RowErrorKind::InvalidBudget { .. }
        ));
    }

    #[test]
    fn test_parse_rows_sign_mismatch_is_kept_and_reported() {
        let csv = "Month,Type,Category,Amount\nJan2025,Fixed,Refund,80\n";
        let report = parse_rows(rows(csv), MAX_ROWS).unwrap();
        assert_eq!(report.transactions().len(), 1);
        assert_eq!(report.transactions().data()[0].amount().value(), Decimal::from(80));
        assert_eq!(report.warnings().len(), 1);
        assert_eq!(
            report.warnings()[0].to_string(),
            "Row 2: a Fixed amount of $80.00 has an unexpected sign"
        );
    }

    #[test]
    fn test_parse_rows_schema_errors() {
        let err = parse_rows(Vec::new(), MAX_ROWS).unwrap_err();
        assert!(matches!(err, LoadError::Schema(_)));
        let err = parse_rows(rows("Month,Type,Amount\n"), MAX_ROWS).unwrap_err();
        assert!(err.to_string().contains("Category"));
    }

    #[test]
    fn test_parse_rows_header_only() {
        let report = parse_rows(rows("Month,Type,Category,Amount\n"), MAX_ROWS).unwrap();
        assert!(report.transactions().is_empty());
        assert!(report.rejected().is_empty());
    }

    #[test]
    fn test_parse_rows_truncates_and_skips_blank() {
        let csv = "Month,Type,Category,Amount\n\
                   Jan2025,Income,Salary,1\n\
                   ,,,\n\
                   Jan2025,Income,Salary,2\n\
                   Jan2025,Income,Salary,3\n";
        let report = parse_rows(rows(csv), 2).unwrap();
        assert_eq!(report.transactions().len(), 2);
        assert_eq!(report.truncated_rows(), 1);
    }

    #[tokio::test]
    async fn test_fallback_prefers_file() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "mine.csv", JANUARY_CSV);
        let loaded = load_with_fallback(
            Some(Box::new(CsvFile::new(&path, MAX_FILE_BYTES))),
            Some(Box::new(InMemory::demo())),
            &Limits::default(),
        )
        .await
        .unwrap();
        assert_eq!(loaded.data_source, DataSource::Uploaded);
        assert_eq!(loaded.report.transactions().len(), 3);
    }

    #[tokio::test]
    async fn test_fallback_to_sheet_when_file_is_bad() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "bad.csv", "Month,Amount\nJan2025,1\n");
        let sheet = InMemory::from_csv("sheet", JANUARY_CSV).unwrap();
        let loaded = load_with_fallback(
            Some(Box::new(CsvFile::new(&path, MAX_FILE_BYTES))),
            Some(Box::new(sheet)),
            &Limits::default(),
        )
        .await
        .unwrap();
        assert_eq!(loaded.data_source, DataSource::GoogleSheets);
        assert_eq!(loaded.name, "sheet");
    }

    #[tokio::test]
    async fn test_fallback_to_demo() {
        let empty_sheet = InMemory::from_csv("sheet", "Month,Type,Category,Amount\n").unwrap();
        let loaded = load_with_fallback(None, Some(Box::new(empty_sheet)), &Limits::default())
            .await
            .unwrap();
        assert_eq!(loaded.data_source, DataSource::Demo);
        assert_eq!(loaded.report.transactions().len(), 12);
    }

    #[tokio::test]
    async fn test_load_propagates_source_error() {
        let dir = TempDir::new().unwrap();
        let mut source = CsvFile::new(dir.path().join("missing.csv"), MAX_FILE_BYTES);
        let err = load(&mut source, &Limits::default()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::SourceUnavailable { .. })
        ));
    }
}
