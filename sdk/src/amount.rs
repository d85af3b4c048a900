use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    constants::PERCENT_SCALE,
    errors::{Result, RevenueShareError},
};

/// Token amount with two decimal places, stored as hundredths
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_hundredths(hundredths: u64) -> Self {
        Amount(hundredths)
    }

    pub const fn hundredths(self) -> u64 {
        self.0
    }

    /// Converts a decimal amount, rounding half away from zero at the second decimal
    pub fn from_decimal(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(RevenueShareError::InvalidAmount(value.to_string()));
        }
        let scaled = (value * PERCENT_SCALE).round();
        if scaled >= u64::MAX as f64 {
            return Err(RevenueShareError::InvalidAmount(value.to_string()));
        }
        Ok(Amount(scaled as u64))
    }

    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / PERCENT_SCALE
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
