use crate::error::LoadError;
use std::collections::HashMap;

pub(crate) const MONTH_STR: &str = "Month";
pub(crate) const TYPE_STR: &str = "Type";
pub(crate) const CATEGORY_STR: &str = "Category";
pub(crate) const AMOUNT_STR: &str = "Amount";
pub(crate) const DESCRIPTION_STR: &str = "Description";
pub(crate) const BUDGET_STR: &str = "Budget";

const REQUIRED: [&str; 4] = [MONTH_STR, TYPE_STR, CATEGORY_STR, AMOUNT_STR];

/// Locates the columns of interest in a header row. Columns may appear in any order and unknown
/// columns are ignored.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub(crate) struct Mapping {
    month: usize,
    transaction_type: usize,
    category: usize,
    amount: usize,
    description: Option<usize>,
    budget: Option<usize>,
}

impl Mapping {
    /// Builds the mapping from the header row. Header text is trimmed and matched exactly.
    ///
    /// # Errors
    /// `LoadError::Schema` if a required column is missing or a known column appears twice.
    pub(crate) fn new<S, I>(headers: I) -> Result<Self, LoadError>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S>,
    {
        let headers: Vec<Header> = headers.into_iter().map(|s| Header::new(s.as_ref())).collect();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for (ix, header) in headers.iter().enumerate() {
            let name = header.as_ref();
            if !is_known(name) {
                continue;
            }
            if index.insert(name, ix).is_some() {
                return Err(LoadError::Schema(format!("Duplicate column '{name}'")));
            }
        }

        let missing: Vec<&str> = REQUIRED
            .iter()
            .copied()
            .filter(|name| !index.contains_key(name))
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::Schema(format!(
                "Missing required columns: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            month: index[MONTH_STR],
            transaction_type: index[TYPE_STR],
            category: index[CATEGORY_STR],
            amount: index[AMOUNT_STR],
            description: index.get(DESCRIPTION_STR).copied(),
            budget: index.get(BUDGET_STR).copied(),
        })
    }

    /// True if the header has a `Budget` column.
    pub(crate) fn has_budget(&self) -> bool {
        self.budget.is_some()
    }

    pub(crate) fn month<'a>(&self, row: &'a [String]) -> &'a str {
        cell(row, Some(self.month))
    }

    pub(crate) fn transaction_type<'a>(&self, row: &'a [String]) -> &'a str {
        cell(row, Some(self.transaction_type))
    }

    pub(crate) fn category<'a>(&self, row: &'a [String]) -> &'a str {
        cell(row, Some(self.category))
    }

    pub(crate) fn amount<'a>(&self, row: &'a [String]) -> &'a str {
        cell(row, Some(self.amount))
    }

    pub(crate) fn description<'a>(&self, row: &'a [String]) -> &'a str {
        cell(row, self.description)
    }

    pub(crate) fn budget<'a>(&self, row: &'a [String]) -> &'a str {
        cell(row, self.budget)
    }
}

/// Rows from the Sheets export can be shorter than the header when trailing cells are empty, so
/// a missing cell reads as empty.
fn cell(row: &[String], ix: Option<usize>) -> &str {
    ix.and_then(|ix| row.get(ix))
        .map(|s| s.trim())
        .unwrap_or_default()
}

fn is_known(name: &str) -> bool {
    REQUIRED.contains(&name) || name == DESCRIPTION_STR || name == BUDGET_STR
}

/// A header cell, for example `Amount`. Surrounding whitespace is removed, as is the byte order
/// mark that spreadsheet programs put in front of the first header of a CSV export.
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub(crate) struct Header(String);

impl Header {
    pub(crate) fn new(s: &str) -> Self {
        Self(s.trim_start_matches('\u{feff}').trim().to_string())
    }
}

impl AsRef<str> for Header {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
