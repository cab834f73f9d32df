//! Types that represent the transaction data, such as `Transaction`, `Amount` and `MonthKey`.
mod amount;
pub(crate) mod mapping;
mod month;
mod transaction;

pub use amount::{Amount, AmountError};
pub use month::{MonthError, MonthKey};
pub use transaction::{ExpectedSign, Transaction, TransactionType, Transactions};
