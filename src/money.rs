//! Monetary amounts with decimal precision.
//!
//! Never floating point for money. `Amount` wraps `rust_decimal::Decimal`;
//! the only ways in are the fallible constructors, so a `NaN` or an infinity
//! can never reach the aggregation or rendering stages.

use crate::error::ReportError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

/// A signed monetary amount.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Parse an amount from text. Empty and non-numeric input is an error,
    /// never a silent zero.
    pub fn parse(input: &str) -> Result<Self, ReportError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ReportError::InvalidAmount {
                value: input.to_string(),
                reason: "empty value".to_string(),
            });
        }
        trimmed
            .parse::<Decimal>()
            .map(Amount)
            .map_err(|e| ReportError::InvalidAmount {
                value: input.to_string(),
                reason: e.to_string(),
            })
    }

    /// Convert from a float. `NaN` and infinities are rejected.
    pub fn from_f64(value: f64) -> Result<Self, ReportError> {
        if !value.is_finite() {
            return Err(ReportError::InvalidAmount {
                value: value.to_string(),
                reason: "not a finite number".to_string(),
            });
        }
        Decimal::from_f64_retain(value)
            .map(Amount)
            .ok_or_else(|| ReportError::InvalidAmount {
                value: value.to_string(),
                reason: "out of range for a decimal amount".to_string(),
            })
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Format with exactly two decimal places and thousands separators,
    /// e.g. `-12,345.08`.
    pub fn format(&self) -> String {
        // Scale 2 fits in i128 for any realistic ledger value. Values past
        // that saturate; they are never formatted as zero.
        let cents = match self
            .0
            .round_dp(2)
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|c| c.to_i128())
        {
            Some(c) => c,
            None => {
                log::warn!("amount {} exceeds the formattable range, clamping", self.0);
                if self.0.is_sign_negative() {
                    i128::MIN
                } else {
                    i128::MAX
                }
            }
        };
        let negative = cents < 0;
        let cents = cents.unsigned_abs();
        let units = cents / 100;
        let frac = cents % 100;

        let digits = units.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        format!(
            "{}{}.{:02}",
            if negative { "-" } else { "" },
            grouped,
            frac
        )
    }

    /// Format with a currency-code prefix, e.g. `USD 1,234.50`.
    pub fn format_with_code(&self, code: &str) -> String {
        format!("{} {}", code, self.format())
    }
}

impl Add for Amount {
    type Output = Amount;
    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;
    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl Neg for Amount {
    type Output = Amount;
    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, |acc, a| acc + *a)
    }
}
