use crate::api::Mode;
use crate::args::SummaryArgs;
use crate::commands::{load, log_problems, Out};
use crate::error::RowError;
use crate::loader::{DataSource, DataWarning};
use crate::model::{Amount, TransactionType};
use crate::report::{category_breakdown_for, SummaryReport};
use crate::{Config, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Everything `findash summary --format json` prints.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryOut {
    pub data_source: DataSource,
    pub source: String,
    pub rejected: Vec<RowError>,
    pub warnings: Vec<DataWarning>,
    pub truncated_rows: usize,
    pub report: SummaryReport,
    /// Where the `Variable` spending went, as positive numbers.
    pub spending: BTreeMap<String, Decimal>,
}

/// Loads the transactions and summarizes the ones that pass the filter.
///
/// # Errors
/// Returns an error if the filter arguments are invalid or the transactions cannot be loaded.
pub async fn summary(
    config: &Config,
    mode: Mode,
    args: &SummaryArgs,
) -> Result<Out<SummaryOut>> {
    let filter = args.filter().to_filter()?;
    let loaded = load(config, mode, args.source()).await?;
    log_problems(&loaded);

    let transactions = loaded.report.transactions();
    let report = SummaryReport::new(transactions, &filter);
    let spending = category_breakdown_for(transactions, &filter, &TransactionType::Variable);
    let out = SummaryOut {
        data_source: loaded.data_source,
        source: loaded.name.clone(),
        rejected: loaded.report.rejected().to_vec(),
        warnings: loaded.report.warnings().to_vec(),
        truncated_rows: loaded.report.truncated_rows(),
        report,
        spending,
    };
    let message = format!(
        "Summarized {} transactions from {}",
        out.report.transaction_count(),
        out.source
    );
    let body = render(&out);
    Ok(Out::new(message, out).with_body(body))
}

fn money(value: Decimal) -> String {
    Amount::from(value).to_string()
}

fn percent(ratio: Option<Decimal>) -> String {
    match ratio {
        Some(ratio) => match ratio.checked_mul(Decimal::ONE_HUNDRED) {
            Some(pct) => format!("{}%", pct.round_dp(1)),
            None => String::from("n/a"),
        },
        None => String::from("n/a"),
    }
}

fn render(out: &SummaryOut) -> String {
    let report = &out.report;
    let mut s = String::new();
    let _ = writeln!(s, "Source: {} ({})", out.source, out.data_source);
    let _ = writeln!(s, "Transactions: {}", report.transaction_count());
    if !out.rejected.is_empty() {
        let _ = writeln!(s, "Skipped rows: {}", out.rejected.len());
    }
    if out.truncated_rows > 0 {
        let _ = writeln!(s, "Rows not loaded: {}", out.truncated_rows);
    }
    let _ = writeln!(s);

    let _ = writeln!(s, "{:<16}{:>16}", "Total income", money(report.total_income()));
    let _ = writeln!(s, "{:<16}{:>16}", "Total expenses", money(report.total_expenses()));
    let _ = writeln!(s, "{:<16}{:>16}", "Balance", money(report.balance()));
    let _ = writeln!(s, "{:<16}{:>16}", "Savings rate", percent(report.savings_rate()));
    if !report.total_investments().is_zero() {
        let _ = writeln!(s, "{:<16}{:>16}", "Investments", money(report.total_investments()));
    }

    if !report.breakdown().is_empty() {
        let _ = writeln!(s, "\nBy category");
        for (category, total) in report.breakdown() {
            let _ = writeln!(s, "  {category:<22}{:>16}", money(*total));
        }
    }

    if !report.time_series().is_empty() {
        let _ = writeln!(s, "\nBy month");
        for (month, totals) in report.time_series() {
            let _ = write!(s, "  {month}");
            for (transaction_type, total) in totals {
                let _ = write!(s, "  {transaction_type} {}", money(*total));
            }
            let net = report.savings_trend().get(month).copied().unwrap_or_default();
            let _ = writeln!(s, "  Net {}", money(net));
        }
    }

    if let Some(budget) = report.budget_comparison() {
        let _ = writeln!(s, "\nBudget vs actual");
        for (category, line) in budget {
            let _ = writeln!(
                s,
                "  {category:<22}{:>16}{:>16}",
                money(line.budget),
                money(line.actual)
            );
        }
    }
    s
}
