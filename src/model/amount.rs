//! Money values as they appear in a transactions sheet.
//!
//! Cells may carry a dollar sign and thousands separators, e.g. `-$1,200.00`, which is what a
//! Google sheet export produces for a currency-formatted column. Plain numbers such as `-1200`
//! are what most hand-written CSV files contain. Both parse to the same `Decimal`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// A signed monetary amount. Positive is money coming in, negative is money going out.
///
/// Parsing accepts an optional leading `-` or `+`, an optional `$` on either side of the sign and
/// comma thousands separators in groups of three. Magnitudes above `Amount::MAX` are rejected.
/// Display always renders the currency form, `-$1,200.00`.
///
/// ```
/// # use findash::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("-$1,200.00").unwrap();
/// let b = Amount::from_str("-1200").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(b.to_string(), "-$1,200.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// The largest magnitude accepted when parsing, one quadrillion. Sums of parsed amounts stay
    /// far below what `Decimal` can hold.
    pub const MAX: Amount = Amount(Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0));

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Zero is neither positive nor negative.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }
}

/// The text could not be read as a number.
#[derive(Clone, Eq, PartialEq)]
pub struct AmountError {
    text: String,
}

impl AmountError {
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "AmountError({:?})", self.text)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid amount", self.text)
    }
}

impl std::error::Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || AmountError {
            text: s.to_string(),
        };
        let trimmed = s.trim();
        let (sign, rest) = strip_sign(trimmed);

        // "$-5" is as common in exports as "-$5"
        let rest = rest.strip_prefix('$').unwrap_or(rest);
        let (sign, rest) = match (sign, strip_sign(rest)) {
            (None, (inner_sign, inner)) => (inner_sign, inner),
            (Some(_), (None, _)) => (sign, rest),
            (Some(_), (Some(_), _)) => return Err(err()),
        };

        let digits = ungroup(rest).ok_or_else(err)?;
        if digits.is_empty() || !digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            return Err(err());
        }
        let value = Decimal::from_str(&digits).map_err(|_| err())?;
        if value > Amount::MAX.0 {
            return Err(err());
        }
        Ok(Amount(if sign == Some('-') { -value } else { value }))
    }
}

fn strip_sign(s: &str) -> (Option<char>, &str) {
    match s.chars().next() {
        Some(c @ ('-' | '+')) => (Some(c), &s[1..]),
        _ => (None, s),
    }
}

/// Removes thousands separators. Groups after the first must have exactly three digits and the
/// fraction may not contain commas, so `1,2,3` is rejected rather than read as 123.
fn ungroup(s: &str) -> Option<String> {
    if !s.contains(',') {
        return Some(s.to_string());
    }
    let (int, frac) = match s.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (s, None),
    };
    if frac.is_some_and(|f| f.contains(',')) {
        return None;
    }
    let mut groups = int.split(',');
    let first = groups.next().unwrap_or_default();
    if first.is_empty() || first.len() > 3 {
        return None;
    }
    let mut out = first.to_string();
    for group in groups {
        if group.len() != 3 {
            return None;
        }
        out.push_str(group);
    }
    if let Some(frac) = frac {
        out.push('.');
        out.push_str(frac);
    }
    Some(out)
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let magnitude = self.0.abs().to_f64().unwrap_or_default();
        write!(f, "{sign}${}", format_num::format_num!(",.2", magnitude))
    }
}

/// Serializes as the exact decimal string, e.g. `"-1200.50"`, so that consumers do not lose
/// precision.
impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
