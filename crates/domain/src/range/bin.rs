//! Range calculation for the bin model.

use super::RangeStrategy;
use super::profile::RangeProfile;
use crate::value_objects::Range;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Symmetric range of `num_bins` bins centred on the active bin.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinRange;

impl BinRange {
    /// Number of bins a profile asks for at a given bin step, before clamping.
    #[must_use]
    pub fn bins_for_range(bin_step: u16, profile: &RangeProfile) -> u32 {
        if bin_step == 0 {
            return profile.max_bins;
        }
        (profile.range_pct * Decimal::from(10_000) / Decimal::from(bin_step))
            .floor()
            .to_u32()
            .unwrap_or(u32::MAX)
    }

    /// Number of bins after applying the profile floor and the protocol ceiling.
    #[must_use]
    pub fn num_bins(bin_step: u16, profile: &RangeProfile) -> u32 {
        Self::bins_for_range(bin_step, profile).clamp(profile.min_bins, profile.max_bins)
    }
}

impl RangeStrategy for BinRange {
    fn compute(&self, current_index: i32, spacing_unit: u16, profile: &RangeProfile) -> Range {
        let half = (Self::num_bins(spacing_unit, profile) / 2) as i32;
        Range::new(current_index - half, current_index + half)
    }

    fn name(&self) -> &'static str {
        "bin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::RiskProfile;

    #[test]
    fn test_medium_profile_hits_ceiling() {
        let profile = RangeProfile::for_profile(RiskProfile::Medium);
        assert_eq!(BinRange::bins_for_range(25, &profile), 80);
        assert_eq!(BinRange::num_bins(25, &profile), 69);

        let range = BinRange.compute(8_388_608, 25, &profile);
        assert_eq!(range, Range::new(8_388_608 - 34, 8_388_608 + 34));
    }

    #[test]
    fn test_wide_step_hits_floor() {
        let profile = RangeProfile::for_profile(RiskProfile::High);
        // 750 / 100 = 7 bins, floored up to 10
        assert_eq!(BinRange::bins_for_range(100, &profile), 7);
        assert_eq!(BinRange::num_bins(100, &profile), 10);
        assert_eq!(BinRange.compute(1000, 100, &profile), Range::new(995, 1005));
    }

    #[test]
    fn test_within_bounds() {
        let profile = RangeProfile::for_profile(RiskProfile::High);
        // 750 / 20 = 37 bins, odd count gives half 18
        assert_eq!(BinRange::num_bins(20, &profile), 37);
        assert_eq!(BinRange.compute(0, 20, &profile), Range::new(-18, 18));
    }
}
