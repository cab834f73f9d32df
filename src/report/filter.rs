use crate::model::{MonthKey, Transaction, TransactionType, Transactions};
use serde::Serialize;
use std::collections::BTreeSet;

/// Restricts which transactions a report covers. Every criterion that is set must hold. An unset
/// criterion lets everything through, while a set but empty one lets nothing through.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    months: Option<BTreeSet<MonthKey>>,
    /// Inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<MonthKey>,
    /// Inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<MonthKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    types: Option<BTreeSet<TransactionType>>,
}

impl Filter {
    /// A filter that matches everything.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_months(mut self, months: impl IntoIterator<Item = MonthKey>) -> Self {
        self.months = Some(months.into_iter().collect());
        self
    }

    pub fn with_range(mut self, from: Option<MonthKey>, to: Option<MonthKey>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn with_categories<S: Into<String>>(
        mut self,
        categories: impl IntoIterator<Item = S>,
    ) -> Self {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = TransactionType>) -> Self {
        self.types = Some(types.into_iter().collect());
        self
    }

    pub fn is_all(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches(&self, t: &Transaction) -> bool {
        let month = t.month();
        self.months.as_ref().map_or(true, |m| m.contains(&month))
            && self.from.map_or(true, |from| month >= from)
            && self.to.map_or(true, |to| month <= to)
            && self
                .categories
                .as_ref()
                .map_or(true, |c| c.contains(t.category()))
            && self
                .types
                .as_ref()
                .map_or(true, |types| types.contains(t.transaction_type()))
    }

    /// The transactions that match, in their original order.
    pub fn apply<'a>(
        &'a self,
        transactions: &'a Transactions,
    ) -> impl Iterator<Item = &'a Transaction> {
        transactions.iter().filter(move |t| self.matches(t))
    }
}
