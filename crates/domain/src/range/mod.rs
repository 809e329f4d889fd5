//! Range-calculation engine.
//!
//! Maps `(current_index, spacing_unit, profile)` to a concrete `Range` in the
//! pool's native index units. Both models implement [`RangeStrategy`]; the
//! [`RangeEngine`] enum selects one from the pool's declared model.

mod bin;
mod profile;
mod tick;

pub use bin::BinRange;
pub use profile::{MAX_BINS_PER_POSITION, RangeProfile};
pub use tick::TickRange;

use crate::enums::{AmmModel, RiskProfile};
use crate::value_objects::Range;
use tracing::debug;

/// Strategy for turning a risk profile into a concrete range.
pub trait RangeStrategy {
    /// Computes the range around `current_index`.
    fn compute(&self, current_index: i32, spacing_unit: u16, profile: &RangeProfile) -> Range;

    /// Returns the strategy name.
    fn name(&self) -> &'static str;
}

/// Range engine dispatched on the pool model.
#[derive(Debug, Clone, Copy)]
pub enum RangeEngine {
    /// Discretized-bin model.
    Bin(BinRange),
    /// Tick-indexed model.
    Tick(TickRange),
}

impl RangeEngine {
    /// Returns the engine for a pool model.
    #[must_use]
    pub fn for_model(model: AmmModel) -> Self {
        match model {
            AmmModel::Bin => Self::Bin(BinRange),
            AmmModel::Tick => Self::Tick(TickRange),
        }
    }

    /// Computes the range for a named profile.
    #[must_use]
    pub fn compute_for(&self, current_index: i32, spacing_unit: u16, profile: RiskProfile) -> Range {
        let preset = RangeProfile::for_profile(profile);
        let range = self.compute(current_index, spacing_unit, &preset);
        debug!(
            model = self.name(),
            current_index,
            spacing_unit,
            profile = %profile,
            lower = range.lower,
            upper = range.upper,
            "Computed range"
        );
        range
    }
}

impl RangeStrategy for RangeEngine {
    fn compute(&self, current_index: i32, spacing_unit: u16, profile: &RangeProfile) -> Range {
        match self {
            Self::Bin(engine) => engine.compute(current_index, spacing_unit, profile),
            Self::Tick(engine) => engine.compute(current_index, spacing_unit, profile),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Bin(engine) => engine.name(),
            Self::Tick(engine) => engine.name(),
        }
    }
}

/// Computes a range for `model` from a profile name; unknown names use `medium`.
#[must_use]
pub fn calculate_range(model: AmmModel, current_index: i32, spacing_unit: u16, profile: &str) -> Range {
    RangeEngine::for_model(model).compute_for(
        current_index,
        spacing_unit,
        RiskProfile::parse_lossy(profile),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::price_tick::is_aligned;
    use proptest::prelude::*;

    fn any_profile() -> impl Strategy<Value = RiskProfile> {
        prop_oneof![
            Just(RiskProfile::High),
            Just(RiskProfile::Medium),
            Just(RiskProfile::Low),
        ]
    }

    #[test]
    fn test_unknown_profile_uses_medium() {
        let fallback = calculate_range(AmmModel::Bin, 100, 25, "extreme");
        let medium = calculate_range(AmmModel::Bin, 100, 25, "medium");
        assert_eq!(fallback, medium);

        let fallback = calculate_range(AmmModel::Tick, 640, 64, "???");
        let medium = calculate_range(AmmModel::Tick, 640, 64, "medium");
        assert_eq!(fallback, medium);
    }

    #[test]
    fn test_dispatch_by_model() {
        assert_eq!(RangeEngine::for_model(AmmModel::Bin).name(), "bin");
        assert_eq!(RangeEngine::for_model(AmmModel::Tick).name(), "tick");
    }

    proptest! {
        #[test]
        fn prop_num_bins_within_profile_bounds(step in 1u16..=500, profile in any_profile()) {
            let preset = RangeProfile::for_profile(profile);
            let n = BinRange::num_bins(step, &preset);
            prop_assert!(n >= preset.min_bins && n <= MAX_BINS_PER_POSITION);
        }

        #[test]
        fn prop_num_bins_non_increasing_in_step(step in 1u16..500, profile in any_profile()) {
            let preset = RangeProfile::for_profile(profile);
            prop_assert!(BinRange::num_bins(step + 1, &preset) <= BinRange::num_bins(step, &preset));
        }

        #[test]
        fn prop_bin_range_contains_current(current in -1_000_000i32..1_000_000, step in 1u16..=500, profile in any_profile()) {
            let range = RangeEngine::for_model(AmmModel::Bin).compute_for(current, step, profile);
            prop_assert!(range.lower <= current && current <= range.upper);
        }

        #[test]
        fn prop_tick_bounds_aligned(current in -400_000i32..400_000, spacing in 1u16..=256, profile in any_profile()) {
            let range = RangeEngine::for_model(AmmModel::Tick).compute_for(current, spacing, profile);
            prop_assert!(is_aligned(range.lower, spacing));
            prop_assert!(is_aligned(range.upper, spacing));
        }

        #[test]
        fn prop_tick_range_contains_aligned_current(slot in -3_000i32..3_000, spacing in 1u16..=256, profile in any_profile()) {
            let current = slot * i32::from(spacing);
            let range = RangeEngine::for_model(AmmModel::Tick).compute_for(current, spacing, profile);
            prop_assert!(range.lower <= current && current <= range.upper);
        }
    }
}
