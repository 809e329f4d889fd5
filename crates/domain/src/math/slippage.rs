/// Basis points denominator.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Minimum amount received after slippage.
///
/// `min_out = floor(expected * (10_000 - slippage_bps) / 10_000)`
pub fn min_out(expected_amount: u64, slippage_bps: u16) -> u64 {
    let bps = u128::from(slippage_bps).min(BPS_DENOMINATOR);
    let factor = BPS_DENOMINATOR - bps;
    ((u128::from(expected_amount) * factor) / BPS_DENOMINATOR) as u64
}

/// Maximum amount paid after slippage, saturating at `u64::MAX`.
///
/// `max_in = ceil(expected * (10_000 + slippage_bps) / 10_000)`
pub fn max_in(expected_amount: u64, slippage_bps: u16) -> u64 {
    let factor = BPS_DENOMINATOR + u128::from(slippage_bps);
    let num = u128::from(expected_amount) * factor;
    let value = num.div_ceil(BPS_DENOMINATOR);
    u64::try_from(value).unwrap_or(u64::MAX)
}
