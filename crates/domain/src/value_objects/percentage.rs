use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A fraction stored as a decimal, e.g. `0.005` for half a percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Percentage(pub Decimal);

impl Percentage {
    /// Builds a fraction from a human percentage (`0.5` means 0.5%).
    pub fn from_percent(percent: Decimal) -> Self {
        Self(percent / Decimal::from(100))
    }

    /// Basis points, rounded to the nearest integer and saturating at `u16::MAX`.
    pub fn to_bps(&self) -> u16 {
        let bps = (self.0 * Decimal::from(10000)).round();
        if bps.is_sign_negative() {
            return 0;
        }
        bps.to_u16().unwrap_or(u16::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bps_conversions() {
        assert_eq!(Percentage::from_percent(dec!(0.5)).0, dec!(0.005));
        assert_eq!(Percentage::from_percent(dec!(0.5)).to_bps(), 50);
        assert_eq!(Percentage::from_percent(dec!(1)).to_bps(), 100);
        assert_eq!(Percentage(dec!(-0.01)).to_bps(), 0);
    }
}
