//! Range calculation for the tick model.

use super::RangeStrategy;
use super::profile::RangeProfile;
use crate::math::price_tick::{TICK_BASE, align_tick_down};
use crate::value_objects::Range;
use rust_decimal::prelude::ToPrimitive;

/// Range whose bounds are valid, spacing-aligned ticks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickRange;

impl TickRange {
    /// Number of ticks covering the profile's price range.
    #[must_use]
    pub fn ticks_for_range(profile: &RangeProfile) -> i32 {
        let pct = profile.range_pct.to_f64().unwrap_or(0.0);
        ((1.0 + pct).ln() / TICK_BASE.ln()).floor() as i32
    }
}

impl RangeStrategy for TickRange {
    /// `half` and `current_index` are aligned down independently, so an
    /// unaligned current tick shifts the range towards lower ticks.
    fn compute(&self, current_index: i32, spacing_unit: u16, profile: &RangeProfile) -> Range {
        let half = align_tick_down(Self::ticks_for_range(profile) / 2, spacing_unit);
        let center = align_tick_down(current_index, spacing_unit);
        Range::new(center - half, center + half)
    }

    fn name(&self) -> &'static str {
        "tick"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::RiskProfile;

    #[test]
    fn test_high_profile_spacing_64() {
        let profile = RangeProfile::for_profile(RiskProfile::High);
        assert_eq!(TickRange::ticks_for_range(&profile), 723);

        let range = TickRange.compute(0, 64, &profile);
        assert_eq!(range, Range::new(-320, 320));

        let range = TickRange.compute(6400, 64, &profile);
        assert_eq!(range, Range::new(6080, 6720));
    }

    #[test]
    fn test_unaligned_current_tick_shifts_down() {
        let profile = RangeProfile::for_profile(RiskProfile::High);
        // 6463 aligns down to 6400; the range no longer centres on 6463
        let range = TickRange.compute(6463, 64, &profile);
        assert_eq!(range, Range::new(6080, 6720));
        assert!(range.contains(6463));

        // negative unaligned tick floors away from zero
        let range = TickRange.compute(-1, 64, &profile);
        assert_eq!(range, Range::new(-384, 256));
    }

    #[test]
    fn test_wide_spacing_collapses_half() {
        // ticks_for_range(high)/2 = 361 < 512 -> half aligns to 0
        let profile = RangeProfile::for_profile(RiskProfile::High);
        let range = TickRange.compute(1024, 512, &profile);
        assert_eq!(range, Range::new(1024, 1024));
    }
}
