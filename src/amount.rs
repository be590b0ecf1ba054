//! Monetary amount backed by `rust_decimal`.
//!
//! Amounts are parsed exactly from their text form so that ordering and
//! equality never suffer from binary floating-point rounding. Two amounts
//! that differ only in trailing zeros (`10.5` and `10.50`) compare equal.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A non-negative transaction amount with a total order.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use transaction_report::Amount;
///
/// let amount = Amount::from_str("1250.5").unwrap();
/// assert_eq!(amount.to_string(), "1250.50");
/// assert!(amount > Amount::from_str("99.99").unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Decimal places used when displaying.
    pub const DISPLAY_SCALE: usize = 2;

    /// Zero value.
    pub const ZERO: Self = Amount(Decimal::ZERO);

    /// Wraps a `Decimal`, dropping trailing zeros so equal values hash equally.
    pub fn new(value: Decimal) -> Self {
        Amount(value.normalize())
    }

    /// Builds an amount from a whole number of units.
    pub fn from_units(units: u64) -> Self {
        Amount(Decimal::from(units))
    }

    /// Returns `true` if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Lossy conversion used by the JSON export.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        // `Decimal` would read `1_000` as a thousand; plain numbers only.
        if trimmed.contains('_') {
            return Err(rust_decimal::Error::ErrorString(format!(
                "digit separators not allowed: {}",
                trimmed
            )));
        }
        // Accept scientific notation as well, the way generated datasets sometimes emit it.
        let decimal = Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed))?;
        Ok(Amount::new(decimal))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", Self::DISPLAY_SCALE, self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.to_f64())
    }
}
