//! Decimal money value objects.
//!
//! Marketplace prices, wallet balances and ledger amounts are decimals in the
//! major currency unit. The gateway works in integer minor units (kobo), so
//! conversion happens at the edge via [`Money::to_minor_units`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

use super::ValidationError;

const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// A non-negative monetary value in the major currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a money value, rejecting negative amounts.
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::invalid_format(
                "amount",
                format!("must not be negative, got {}", value),
            ));
        }
        Ok(Self(value))
    }

    /// Creates a money value from integer minor units (e.g. kobo).
    pub fn from_minor_units(minor: i64) -> Result<Self, ValidationError> {
        Self::new(Decimal::new(minor, 2))
    }

    /// Converts to integer minor units, truncating sub-minor fractions.
    pub fn to_minor_units(&self) -> Result<i64, ValidationError> {
        self.0
            .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
            .and_then(|minor| minor.trunc().to_i64())
            .ok_or_else(|| {
                ValidationError::invalid_format("amount", "does not fit in minor units")
            })
    }

    /// Price per unit times a quantity.
    pub fn checked_times(&self, quantity: Decimal) -> Result<Money, ValidationError> {
        let total = self.0.checked_mul(quantity).ok_or_else(|| {
            ValidationError::invalid_format("amount", "price times quantity overflows")
        })?;
        Self::new(total)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A strictly positive amount moved by a credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(ValidationError::not_positive("amount", value))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Money> for Amount {
    type Error = ValidationError;

    fn try_from(money: Money) -> Result<Self, Self::Error> {
        Self::new(money.0)
    }
}

impl From<Amount> for Money {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}
