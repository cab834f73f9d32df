//! Summaries computed from `Transactions` for the dashboard.
//!
//! Everything here is a pure function of its input. Maps are `BTreeMap`s so that the same
//! transactions always produce the same report, down to the order of keys in its JSON.
//!
//! Sign conventions: income is the sum of the positive amounts and expenses the sum of the
//! negative amounts, reported as a negative number. The balance is their sum. The savings rate
//! is `balance / income` as a ratio (0.7 means 70%) and is `None` when there is no income.
//!
//! Totals saturate at the bounds of `Decimal` instead of overflowing.

mod filter;

pub use filter::Filter;

use crate::model::{MonthKey, Transaction, TransactionType, Transactions};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Per-type subtotals of one month.
pub type MonthTotals = BTreeMap<TransactionType, Decimal>;

/// The KPIs and groupings for the transactions selected by a `Filter`.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct SummaryReport {
    transaction_count: usize,
    total_income: Decimal,
    total_expenses: Decimal,
    balance: Decimal,
    savings_rate: Option<Decimal>,
    total_investments: Decimal,
    /// Category to signed subtotal.
    breakdown: BTreeMap<String, Decimal>,
    /// Chronological.
    time_series: BTreeMap<MonthKey, MonthTotals>,
    /// Net (income plus expenses) of each month, chronological.
    savings_trend: BTreeMap<MonthKey, Decimal>,
    /// Only present when the data had a `Budget` column.
    #[serde(skip_serializing_if = "Option::is_none")]
    budget_comparison: Option<BTreeMap<String, BudgetLine>>,
}

/// Actual against budgeted amount for a category.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct BudgetLine {
    pub actual: Decimal,
    pub budget: Decimal,
}

impl SummaryReport {
    /// Computes the report over the transactions that `filter` lets through.
    pub fn new(transactions: &Transactions, filter: &Filter) -> Self {
        let with_budget = transactions.has_budget();
        let mut report = SummaryReport::default();
        let mut budgets: BTreeMap<String, BudgetLine> = BTreeMap::new();

        for t in filter.apply(transactions) {
            report.add(t);
            if with_budget {
                let line = budgets.entry(t.category().to_string()).or_default();
                line.actual = line.actual.saturating_add(t.amount().value());
                let budget = t.budget().map(|b| b.value()).unwrap_or_default();
                line.budget = line.budget.saturating_add(budget);
            }
        }

        report.balance = report.total_income.saturating_add(report.total_expenses);
        report.savings_rate = savings_rate(report.balance, report.total_income);
        if with_budget {
            report.budget_comparison = Some(budgets);
        }
        report
    }

    fn add(&mut self, t: &Transaction) {
        let amount = t.amount().value();
        self.transaction_count += 1;
        if amount.is_sign_positive() {
            accumulate(&mut self.total_income, amount);
        } else {
            accumulate(&mut self.total_expenses, amount);
        }
        if t.transaction_type() == &TransactionType::Investment {
            accumulate(&mut self.total_investments, amount);
        }

        accumulate(
            self.breakdown.entry(t.category().to_string()).or_default(),
            amount,
        );
        accumulate(
            self.time_series
                .entry(t.month())
                .or_default()
                .entry(t.transaction_type().clone())
                .or_default(),
            amount,
        );
        accumulate(self.savings_trend.entry(t.month()).or_default(), amount);
    }

    pub fn transaction_count(&self) -> usize {
        self.transaction_count
    }

    pub fn total_income(&self) -> Decimal {
        self.total_income
    }

    /// Zero or negative.
    pub fn total_expenses(&self) -> Decimal {
        self.total_expenses
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// `None` when there is no income to divide by.
    pub fn savings_rate(&self) -> Option<Decimal> {
        self.savings_rate
    }

    pub fn total_investments(&self) -> Decimal {
        self.total_investments
    }

    pub fn breakdown(&self) -> &BTreeMap<String, Decimal> {
        &self.breakdown
    }

    pub fn time_series(&self) -> &BTreeMap<MonthKey, MonthTotals> {
        &self.time_series
    }

    pub fn savings_trend(&self) -> &BTreeMap<MonthKey, Decimal> {
        &self.savings_trend
    }

    pub fn budget_comparison(&self) -> Option<&BTreeMap<String, BudgetLine>> {
        self.budget_comparison.as_ref()
    }
}

/// Shorthand for `SummaryReport::new`.
pub fn summarize(transactions: &Transactions, filter: &Filter) -> SummaryReport {
    SummaryReport::new(transactions, filter)
}

fn accumulate(total: &mut Decimal, amount: Decimal) {
    *total = total.saturating_add(amount);
}

fn savings_rate(balance: Decimal, income: Decimal) -> Option<Decimal> {
    if income > Decimal::ZERO {
        balance.checked_div(income)
    } else {
        None
    }
}

/// The size of each category within one type, as positive numbers, e.g. where the `Variable`
/// spending went.
pub fn category_breakdown_for(
    transactions: &Transactions,
    filter: &Filter,
    transaction_type: &TransactionType,
) -> BTreeMap<String, Decimal> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for t in filter
        .apply(transactions)
        .filter(|t| t.transaction_type() == transaction_type)
    {
        accumulate(
            totals.entry(t.category().to_string()).or_default(),
            t.amount().value(),
        );
    }
    totals.values_mut().for_each(|v| *v = v.abs());
    totals
}

/// The distinct values present in the data, for offering filter choices.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct Choices {
    pub months: BTreeSet<MonthKey>,
    pub categories: BTreeSet<String>,
    pub types: BTreeSet<TransactionType>,
}

pub fn choices(transactions: &Transactions) -> Choices {
    let mut choices = Choices::default();
    for t in transactions {
        choices.months.insert(t.month());
        choices.categories.insert(t.category().to_string());
        choices.types.insert(t.transaction_type().clone());
    }
    choices
}
