use crate::error::{DomainError, DomainResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest power of ten a `Decimal` can hold.
const MAX_DECIMAL_EXPONENT: u32 = 28;

/// `10^exponent` as a `Decimal`.
///
/// # Errors
/// `Overflow` when the power exceeds the `Decimal` range.
fn pow10(exponent: u32) -> DomainResult<Decimal> {
    if exponent > MAX_DECIMAL_EXPONENT {
        return Err(DomainError::overflow(format!("10^{exponent} exceeds the decimal range")));
    }
    let value = 10i128
        .checked_pow(exponent)
        .ok_or_else(|| DomainError::overflow(format!("10^{exponent}")))?;
    Decimal::try_from_i128_with_scale(value, 0)
        .map_err(|_| DomainError::overflow(format!("10^{exponent} exceeds the decimal range")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price {
    pub value: Decimal,
}

impl Price {
    /// Converts a base-unit price (B units per A unit) into a UI price by
    /// shifting for the mints' decimals.
    ///
    /// # Errors
    /// `Overflow` when the decimals difference or the shifted value leaves
    /// the `Decimal` range.
    pub fn from_raw(raw: Decimal, decimals_a: u8, decimals_b: u8) -> DomainResult<Self> {
        let shift = i32::from(decimals_a) - i32::from(decimals_b);
        let factor = pow10(shift.unsigned_abs())?;
        let value = if shift >= 0 {
            raw.checked_mul(factor)
        } else {
            raw.checked_div(factor)
        }
        .ok_or_else(|| DomainError::overflow(format!("price {raw} shifted by {shift} decimals")))?;
        Ok(Self { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_raw_shifts_decimals() {
        // SOL (9) / USDC (6): raw 0.15 USDC units per lamport -> 150 USDC per SOL
        let price = Price::from_raw(dec!(0.15), 9, 6).unwrap();
        assert_eq!(price.value, dec!(150));

        let inverse = Price::from_raw(dec!(150), 6, 9).unwrap();
        assert_eq!(inverse.value, dec!(0.15));
    }

    #[test]
    fn test_from_raw_with_wide_decimals() {
        let price = Price::from_raw(dec!(1), 24, 0).unwrap();
        assert_eq!(price.value, dec!(1000000000000000000000000));

        let price = Price::from_raw(dec!(1), 20, 40).unwrap();
        assert_eq!(price.value, dec!(0.00000000000000000001));

        assert!(matches!(Price::from_raw(dec!(1), 40, 0), Err(DomainError::Overflow(_))));
        assert!(matches!(Price::from_raw(dec!(1), 0, 255), Err(DomainError::Overflow(_))));
        assert!(matches!(
            Price::from_raw(Decimal::MAX, 9, 0),
            Err(DomainError::Overflow(_))
        ));
    }

    #[test]
    fn test_pow10_limits() {
        assert_eq!(pow10(0).unwrap(), Decimal::ONE);
        assert_eq!(pow10(6).unwrap(), dec!(1000000));
        assert!(pow10(28).is_ok());
        assert!(pow10(29).is_err());
    }
}
