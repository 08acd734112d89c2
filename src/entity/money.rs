//! Fixed-point money amounts
//!
//! Amounts are held as whole hundredths so sums and comparisons are exact.

use std::fmt;
use std::str::FromStr;

use crate::error::CarLotError;

/// Hundredths per unit
const SCALE: i64 = 100;

/// A decimal amount with two fractional digits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Build from whole units (`Money::from_units(5)` is `5.00`)
    ///
    /// # Panics
    ///
    /// Panics if `units * 100` overflows `i64`; use [`Money::checked_from_units`]
    /// for untrusted input.
    pub const fn from_units(units: i64) -> Self {
        match Self::checked_from_units(units) {
            Some(money) => money,
            None => panic!("Money::from_units overflow"),
        }
    }

    /// Build from whole units, `None` if the amount does not fit
    pub const fn checked_from_units(units: i64) -> Option<Self> {
        match units.checked_mul(SCALE) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Build from hundredths (`Money::from_cents(550)` is `5.50`)
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Arithmetic mean, truncated to hundredths
    ///
    /// Returns `None` for an empty slice.
    pub fn mean(values: &[Money]) -> Option<Money> {
        if values.is_empty() {
            return None;
        }
        let sum: i128 = values.iter().map(|m| m.0 as i128).sum();
        Some(Money((sum / values.len() as i128) as i64))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = SCALE as u64;
        write!(f, "{}{}.{:02}", sign, abs / scale, abs % scale)
    }
}

impl FromStr for Money {
    type Err = CarLotError;

    /// Accepts `[+-]digits[.digits]`; digits past the second fractional
    /// place must be zeros.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CarLotError::MalformedRecord(format!("invalid amount {:?}", s));

        let trimmed = s.trim();
        let (negative, digits) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (digits, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(frac) {
            return Err(invalid());
        }
        if digits.contains('.') && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > 2 && frac[2..].bytes().any(|b| b != b'0') {
            return Err(invalid());
        }

        let mut frac_cents: i64 = 0;
        for (i, b) in frac.bytes().take(2).enumerate() {
            let digit = (b - b'0') as i64;
            frac_cents += if i == 0 { digit * 10 } else { digit };
        }

        let cents = whole
            .parse::<i64>()
            .ok()
            .and_then(|w| w.checked_mul(SCALE))
            .and_then(|w| w.checked_add(frac_cents))
            .ok_or_else(invalid)?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}
