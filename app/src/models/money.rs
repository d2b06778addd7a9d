// app/src/models/money.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount in integer cents. All prices and totals go through this type so
/// that `price × quantity` stays exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Money(i64);

impl Money {
  pub const ZERO: Money = Money(0);

  pub const fn from_cents(cents: i64) -> Self {
    Money(cents)
  }

  pub const fn cents(self) -> i64 {
    self.0
  }

  pub fn checked_add(self, other: Money) -> Option<Money> {
    self.0.checked_add(other.0).map(Money)
  }

  pub fn checked_times(self, quantity: i32) -> Option<Money> {
    self.0.checked_mul(i64::from(quantity)).map(Money)
  }

  pub fn is_negative(self) -> bool {
    self.0 < 0
  }
}

impl fmt::Display for Money {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let sign = if self.0 < 0 { "-" } else { "" };
    let abs = self.0.unsigned_abs();
    write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn displays_two_fractional_digits() {
    assert_eq!(Money::from_cents(3200).to_string(), "32.00");
    assert_eq!(Money::from_cents(350).to_string(), "3.50");
    assert_eq!(Money::from_cents(7).to_string(), "0.07");
    assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
  }

  #[test]
  fn multiplication_is_exact() {
    // 0.10 * 3 is the classic binary floating point trap.
    assert_eq!(Money::from_cents(10).checked_times(3), Some(Money::from_cents(30)));
    assert_eq!(Money::from_cents(350).checked_times(2), Some(Money::from_cents(700)));
  }

  #[test]
  fn exposes_raw_cents_and_sign() {
    assert_eq!(Money::from_cents(1850).cents(), 1850);
    assert!(Money::from_cents(-1).is_negative());
    assert!(!Money::ZERO.is_negative());
  }

  #[test]
  fn overflow_is_reported() {
    assert_eq!(Money::from_cents(i64::MAX).checked_times(2), None);
    assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
  }
}
