//! Static range-width presets.

use crate::enums::RiskProfile;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Hard protocol ceiling on the number of bins a single position may span.
pub const MAX_BINS_PER_POSITION: u32 = 69;

/// Parameters behind a [`RiskProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeProfile {
    /// Profile this preset belongs to.
    pub profile: RiskProfile,
    /// Target price range as a fraction (0.2 = 20%).
    pub range_pct: Decimal,
    /// Minimum number of bins for the bin model.
    pub min_bins: u32,
    /// Maximum number of bins for the bin model.
    pub max_bins: u32,
}

impl RangeProfile {
    /// Returns the preset for a profile.
    #[must_use]
    pub fn for_profile(profile: RiskProfile) -> Self {
        let (range_pct, min_bins) = match profile {
            RiskProfile::High => (Decimal::new(75, 3), 10),
            RiskProfile::Medium => (Decimal::new(20, 2), 20),
            RiskProfile::Low => (Decimal::new(50, 2), 30),
        };
        Self {
            profile,
            range_pct,
            min_bins,
            max_bins: MAX_BINS_PER_POSITION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_presets() {
        assert_eq!(RangeProfile::for_profile(RiskProfile::High).range_pct, dec!(0.075));
        assert_eq!(RangeProfile::for_profile(RiskProfile::Medium).range_pct, dec!(0.20));
        assert_eq!(RangeProfile::for_profile(RiskProfile::Low).range_pct, dec!(0.50));
        for profile in [RiskProfile::High, RiskProfile::Medium, RiskProfile::Low] {
            let preset = RangeProfile::for_profile(profile);
            assert!(preset.min_bins <= preset.max_bins);
            assert_eq!(preset.max_bins, MAX_BINS_PER_POSITION);
        }
    }
}
