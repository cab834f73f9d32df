use crate::model::{Amount, MonthKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The loaded rows of a transactions file or sheet, in source order.
///
/// There is no way to mutate a `Transactions` after it is built; a reload produces a new one.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Transactions {
    data: Vec<Transaction>,
    #[serde(skip)]
    budget_column: bool,
}

impl Transactions {
    pub fn new(data: Vec<Transaction>) -> Self {
        Self {
            data,
            budget_column: false,
        }
    }

    /// Records whether the source had a `Budget` column, even one with every cell blank.
    pub fn with_budget_column(mut self, budget_column: bool) -> Self {
        self.budget_column = budget_column;
        self
    }

    pub fn data(&self) -> &[Transaction] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.data.iter()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True if the source had a `Budget` column or any row carries a budget.
    pub fn has_budget(&self) -> bool {
        self.budget_column || self.data.iter().any(|t| t.budget.is_some())
    }
}

impl From<Vec<Transaction>> for Transactions {
    fn from(data: Vec<Transaction>) -> Self {
        Self::new(data)
    }
}

impl<'a> IntoIterator for &'a Transactions {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

/// One income or expense record.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    month: MonthKey,
    /// The `Month` cell exactly as written in the source (trimmed).
    month_label: String,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    category: String,
    description: String,
    amount: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    budget: Option<Amount>,
}

impl Transaction {
    /// Creates a transaction whose description is its category and whose month label is the
    /// `YYYY-MM` form of `month`.
    pub fn new(
        month: MonthKey,
        transaction_type: TransactionType,
        category: impl Into<String>,
        amount: Amount,
    ) -> Self {
        let category = category.into();
        Self {
            month,
            month_label: month.label(),
            transaction_type,
            description: category.clone(),
            category,
            amount,
            budget: None,
        }
    }

    pub fn with_month_label(mut self, label: impl Into<String>) -> Self {
        self.month_label = label.into();
        self
    }

    /// An empty description falls back to the category.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        if !description.is_empty() {
            self.description = description;
        }
        self
    }

    pub fn with_budget(mut self, budget: Option<Amount>) -> Self {
        self.budget = budget;
        self
    }

    pub fn month(&self) -> MonthKey {
        self.month
    }

    pub fn month_label(&self) -> &str {
        &self.month_label
    }

    pub fn transaction_type(&self) -> &TransactionType {
        &self.transaction_type
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn budget(&self) -> Option<Amount> {
        self.budget
    }

    /// False when the sign of the amount contradicts the type, e.g. a negative `Income` row.
    /// Zero is consistent with every type.
    pub fn sign_is_consistent(&self) -> bool {
        match self.transaction_type.expected_sign() {
            Some(ExpectedSign::NonNegative) => !self.amount.is_negative(),
            Some(ExpectedSign::NonPositive) => !self.amount.is_positive(),
            None => true,
        }
    }
}

/// The sign an amount should have for a given `TransactionType`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ExpectedSign {
    NonNegative,
    NonPositive,
}

/// The `Type` column. The set is open: labels other than the known ones are kept verbatim in
/// `Other`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TransactionType {
    Income,
    Fixed,
    Variable,
    Investment,
    Other(String),
}

impl TransactionType {
    pub fn expected_sign(&self) -> Option<ExpectedSign> {
        match self {
            TransactionType::Income => Some(ExpectedSign::NonNegative),
            TransactionType::Fixed | TransactionType::Variable => Some(ExpectedSign::NonPositive),
            TransactionType::Investment | TransactionType::Other(_) => None,
        }
    }

    /// Fixed and Variable rows are spending.
    pub fn is_expense(&self) -> bool {
        matches!(self, TransactionType::Fixed | TransactionType::Variable)
    }

    pub fn as_str(&self) -> &str {
        match self {
            TransactionType::Income => INCOME,
            TransactionType::Fixed => FIXED,
            TransactionType::Variable => VARIABLE,
            TransactionType::Investment => INVESTMENT,
            TransactionType::Other(s) => s.as_str(),
        }
    }
}

const INCOME: &str = "Income";
const FIXED: &str = "Fixed";
const VARIABLE: &str = "Variable";
const INVESTMENT: &str = "Investment";

impl Display for TransactionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Known names match case-insensitively, anything else becomes `Other`.
impl FromStr for TransactionType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let known = [
            TransactionType::Income,
            TransactionType::Fixed,
            TransactionType::Variable,
            TransactionType::Investment,
        ];
        Ok(known
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .unwrap_or_else(|| TransactionType::Other(s.to_string())))
    }
}

impl Serialize for TransactionType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TransactionType::from_str(&s).map_err(|never| match never {})
    }
}
