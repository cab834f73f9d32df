use crate::api::Mode;
use crate::args::TransactionsArgs;
use crate::commands::{load, log_problems, Out};
use crate::loader::DataSource;
use crate::model::mapping::{
    AMOUNT_STR, BUDGET_STR, CATEGORY_STR, DESCRIPTION_STR, MONTH_STR, TYPE_STR,
};
use crate::model::{Transaction, Transactions};
use crate::{utils, Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::fmt::Write;
use std::path::Path;

/// How many transactions are listed without `--all`.
const PREVIEW_ROWS: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct TransactionsOut {
    pub data_source: DataSource,
    pub source: String,
    /// The number of transactions that passed the filter.
    pub matched: usize,
    pub transactions: Vec<Transaction>,
}

/// Loads the transactions, applies the filter and lists them. With `--out` the whole filtered set
/// is written to a CSV file that can be loaded again.
///
/// # Errors
/// Returns an error if the transactions cannot be loaded or the file cannot be written.
pub async fn transactions(
    config: &Config,
    mode: Mode,
    args: &TransactionsArgs,
) -> Result<Out<TransactionsOut>> {
    let filter = args.filter().to_filter()?;
    let loaded = load(config, mode, args.source()).await?;
    log_problems(&loaded);

    let all = loaded.report.transactions();
    let selected = Transactions::new(filter.apply(all).cloned().collect())
        .with_budget_column(all.has_budget());
    let matched = selected.len();

    let message = match args.out() {
        Some(path) => {
            write_csv(path, &selected).await?;
            format!("Wrote {matched} transactions to '{}'", path.display())
        }
        None => format!("{matched} transactions from {}", loaded.name),
    };

    let shown: Vec<Transaction> = if args.all() {
        selected.data().to_vec()
    } else {
        selected.iter().take(PREVIEW_ROWS).cloned().collect()
    };
    let mut body = render(&shown);
    if shown.len() < matched {
        let _ = writeln!(body, "... and {} more, use --all to see them", matched - shown.len());
    }

    let out = TransactionsOut {
        data_source: loaded.data_source,
        source: loaded.name,
        matched,
        transactions: shown,
    };
    Ok(Out::new(message, out).with_body(body))
}

fn render(transactions: &[Transaction]) -> String {
    let mut s = String::new();
    for t in transactions {
        let _ = writeln!(
            s,
            "{:<16}{:<12}{:<20}{:>14}  {}",
            t.month_label(),
            t.transaction_type().to_string(),
            t.category(),
            t.amount().to_string(),
            t.description()
        );
    }
    s
}

/// Writes `transactions` in the same layout the loader reads, with a `Budget` column when the
/// source had one.
async fn write_csv(path: &Path, transactions: &Transactions) -> Result<()> {
    let with_budget = transactions.has_budget();
    let mut wtr = csv::Writer::from_writer(Vec::new());
    let mut header = vec![MONTH_STR, TYPE_STR, CATEGORY_STR, DESCRIPTION_STR, AMOUNT_STR];
    if with_budget {
        header.push(BUDGET_STR);
    }
    wtr.write_record(&header)
        .context("Unable to write the CSV header")?;

    for t in transactions {
        let mut record = vec![
            t.month_label().to_string(),
            t.transaction_type().to_string(),
            t.category().to_string(),
            t.description().to_string(),
            t.amount().value().to_string(),
        ];
        if with_budget {
            record.push(
                t.budget()
                    .map(|b| b.value().to_string())
                    .unwrap_or_default(),
            );
        }
        wtr.write_record(&record)
            .context("Unable to write a CSV row")?;
    }
    let bytes = wtr.into_inner().context("Unable to finish the CSV data")?;
    utils::write(path, bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{FilterArgs, OutputFormat, SourceArgs};
    use crate::test::{write_csv as write_test_csv, TestEnv, THREE_MONTH_CSV};

    fn args(source: SourceArgs, all: bool, out: Option<std::path::PathBuf>) -> TransactionsArgs {
        TransactionsArgs::new(source, FilterArgs::default(), all, out, OutputFormat::Text)
    }

    #[tokio::test]
    async fn test_preview_is_limited() {
        let env = TestEnv::new().await;
        let out = transactions(
            &env.config(),
            Mode::Test,
            &args(SourceArgs::new(None, None, true, false), false, None),
        )
        .await
        .unwrap();
        let structure = out.structure().unwrap();
        assert_eq!(structure.matched, 12);
        assert_eq!(structure.transactions.len(), PREVIEW_ROWS);
        assert!(out.body().unwrap().contains("and 2 more"));
    }

    #[tokio::test]
    async fn test_all() {
        let env = TestEnv::new().await;
        let out = transactions(
            &env.config(),
            Mode::Test,
            &args(SourceArgs::new(None, None, true, false), true, None),
        )
        .await
        .unwrap();
        assert_eq!(out.structure().unwrap().transactions.len(), 12);
        assert!(!out.body().unwrap().contains("more"));
    }

    #[tokio::test]
    async fn test_filtered_export_loads_again() {
        let env = TestEnv::new().await;
        let input = write_test_csv(env.dir(), "in.csv", THREE_MONTH_CSV);
        let output = env.dir().path().join("out.csv");
        let filter = FilterArgs::new(
            Vec::new(),
            None,
            None,
            vec![String::from("Food")],
            Vec::new(),
        );
        let export = TransactionsArgs::new(
            SourceArgs::new(Some(input), None, false, false),
            filter,
            false,
            Some(output.clone()),
            OutputFormat::Text,
        );
        let out = transactions(&env.config(), Mode::Test, &export).await.unwrap();
        assert_eq!(out.structure().unwrap().matched, 3);

        let reloaded = transactions(
            &env.config(),
            Mode::Test,
            &args(SourceArgs::new(Some(output), None, false, false), true, None),
        )
        .await
        .unwrap();
        let reloaded = reloaded.structure().unwrap();
        assert_eq!(reloaded.matched, 3);
        assert!(reloaded.transactions.iter().all(|t| t.category() == "Food"));
        assert_eq!(
            reloaded.transactions,
            out.structure().unwrap().transactions
        );
    }
}
