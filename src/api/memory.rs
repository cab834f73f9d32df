//! Implements the very simple `Source` trait using in-memory data.
//!
//! Note: this is compiled even in the "production" version of this app. It backs the built-in
//! demo dataset, which is shown when nothing else can be loaded, and `Mode::Test`.

use crate::api::{csv_rows, Source};
use crate::Result;

/// A source that holds its rows in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemory {
    name: String,
    rows: Vec<Vec<String>>,
}

impl InMemory {
    pub fn new<S, R>(name: impl Into<String>, rows: impl IntoIterator<Item = R>) -> Self
    where
        S: Into<String>,
        R: IntoIterator<Item = S>,
    {
        Self {
            name: name.into(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// # Errors
    /// Returns an error if `csv_data` is not valid CSV.
    pub fn from_csv(name: impl Into<String>, csv_data: &str) -> Result<Self> {
        let name = name.into();
        let rows = csv_rows(&name, csv_data.as_bytes())?;
        Ok(Self { name, rows })
    }

    /// The built-in demo dataset.
    pub fn demo() -> Self {
        Self {
            name: String::from("demo data"),
            rows: demo_rows(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait::async_trait]
impl Source for InMemory {
    fn name(&self) -> &str {
        &self.name
    }

    async fn rows(&mut self) -> Result<Vec<Vec<String>>> {
        Ok(self.rows.clone())
    }
}

fn demo_rows() -> Vec<Vec<String>> {
    DEMO_DATA
        .lines()
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect()
}

/// Two months of a household budget.
pub const DEMO_DATA: &str = "Month,Type,Category,Description,Amount
August2025,Income,Salary,Main job,5000
August2025,Income,Freelance,Freelance work,1200
August2025,Fixed,Housing,Rent,-1200
August2025,Fixed,Utilities,Bills,-400
August2025,Variable,Food,Groceries,-550
August2025,Variable,Leisure,Entertainment,-220
September2025,Income,Salary,Main job,5000
September2025,Income,Freelance,Freelance work,1500
September2025,Fixed,Housing,Rent,-1200
September2025,Fixed,Utilities,Bills,-400
September2025,Variable,Food,Groceries,-600
September2025,Variable,Leisure,Entertainment,-200
";

/// A starting point for users who want to put their own data in a file.
pub const TEMPLATE_DATA: &str = "Month,Type,Category,Description,Amount
January2025,Income,Salary,Monthly salary,5000
January2025,Fixed,Rent,Apartment rent,-1200
January2025,Variable,Food,Groceries,-400
January2025,Variable,Transportation,Gas and parking,-150
February2025,Income,Salary,Monthly salary,5000
February2025,Fixed,Rent,Apartment rent,-1200
";
