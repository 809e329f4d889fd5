use crate::error::{DomainError, DomainResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A token amount in integer base units together with the mint's decimals.
///
/// Only the display conversions go through `Decimal`; arithmetic stays on `raw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount {
    pub raw: u64,
    pub decimals: u8,
}

impl Amount {
    pub fn new(raw: u64, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// UI amount: `raw` scaled down by the mint's decimals.
    ///
    /// # Errors
    /// `Overflow` when `decimals` exceeds the precision `Decimal` can carry.
    pub fn to_decimal(&self) -> DomainResult<Decimal> {
        Decimal::try_from_i128_with_scale(i128::from(self.raw), u32::from(self.decimals)).map_err(|_| {
            DomainError::overflow(format!("{} base units with {} decimals", self.raw, self.decimals))
        })
    }
}

/// Parses a caller-supplied amount given as an integer string in base units.
///
/// Rejects empty, negative, fractional and zero values.
pub fn parse_base_units(input: &str) -> DomainResult<u64> {
    let trimmed = input.trim();
    let value: u64 = trimmed.parse().map_err(|_| {
        DomainError::insufficient_input(format!("'{trimmed}' is not a positive integer amount"))
    })?;
    if value == 0 {
        return Err(DomainError::insufficient_input("amount must be greater than zero"));
    }
    Ok(value)
}
