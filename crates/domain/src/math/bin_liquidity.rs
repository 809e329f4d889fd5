//! Spot-shaped liquidity distribution for the bin model.
//!
//! A spot deposit places the same amount of token X in every bin above the
//! active bin, the same amount of token Y in every bin below it, and half of
//! each per-bin amount in the active bin. The two per-bin amounts carry equal
//! value at the active price.

use super::price_bin::bin_price_x64;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Amounts placed into a single bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinAllocation {
    /// Bin id.
    pub bin_id: i32,
    /// Token X deposited in the bin.
    pub amount_x: u64,
    /// Token Y deposited in the bin.
    pub amount_y: u64,
}

/// Result of sizing a spot deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotDeposit {
    /// Total token X deposited.
    pub amount_x: u64,
    /// Total token Y deposited.
    pub amount_y: u64,
    /// Liquidity units: `Σ price_x64 * x + (y << 64)` over the bins.
    pub liquidity: u128,
    /// Per-bin breakdown, ascending by bin id.
    pub allocations: Vec<BinAllocation>,
}

/// Which token the caller supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotInput {
    /// Amount of token X.
    X(u64),
    /// Amount of token Y.
    Y(u64),
}

fn to_u64(value: U256) -> Result<u64, &'static str> {
    if value > U256::from(u64::MAX) {
        return Err("Overflow converting amount");
    }
    Ok(value.low_u64())
}

/// Sizes a spot deposit over `[lower, upper]` around `active_id`.
///
/// The supplied side fixes the totals; the other side is derived at the active
/// bin price. Returns an error when the supplied token cannot be placed in the
/// range (X below the active bin, Y above it).
pub fn spot_deposit(
    input: SpotInput,
    lower: i32,
    upper: i32,
    active_id: i32,
    bin_step: u16,
) -> Result<SpotDeposit, &'static str> {
    if lower > upper {
        return Err("Lower bin above upper bin");
    }

    let above = i64::from(upper) - i64::from(active_id.max(lower - 1));
    let below = i64::from(active_id.min(upper + 1)) - i64::from(lower);
    let active_in_range = (lower..=upper).contains(&active_id);

    let (amount_x, amount_y) = match input {
        SpotInput::X(x) => {
            if above <= 0 && !active_in_range {
                return Err("Token X cannot be deposited below the active bin");
            }
            if !active_in_range {
                (x, 0)
            } else {
                let price = U256::from(bin_price_x64(active_id, bin_step)?);
                let num = U256::from(x) * price * U256::from(2 * below + 1);
                let den = U256::from(2 * above + 1) << 64;
                (x, to_u64(num / den)?)
            }
        }
        SpotInput::Y(y) => {
            if below <= 0 && !active_in_range {
                return Err("Token Y cannot be deposited above the active bin");
            }
            if !active_in_range {
                (0, y)
            } else {
                let price = U256::from(bin_price_x64(active_id, bin_step)?);
                let num = (U256::from(y) << 64) * U256::from(2 * above + 1);
                let den = price * U256::from(2 * below + 1);
                if den.is_zero() {
                    return Err("Active bin price is zero");
                }
                (to_u64(num / den)?, y)
            }
        }
    };

    let allocations = distribute(amount_x, amount_y, lower, upper, active_id, above, below);

    let mut liquidity = U256::zero();
    for bin in &allocations {
        let price = U256::from(bin_price_x64(bin.bin_id, bin_step)?);
        liquidity += price * U256::from(bin.amount_x) + (U256::from(bin.amount_y) << 64);
    }
    if liquidity > U256::from(u128::MAX) {
        return Err("Overflow converting liquidity");
    }

    Ok(SpotDeposit {
        amount_x,
        amount_y,
        liquidity: liquidity.low_u128(),
        allocations,
    })
}

fn distribute(
    amount_x: u64,
    amount_y: u64,
    lower: i32,
    upper: i32,
    active_id: i32,
    above: i64,
    below: i64,
) -> Vec<BinAllocation> {
    let active_in_range = (lower..=upper).contains(&active_id);
    // Half shares: an X-only bin gets 2 halves, the active bin 1.
    let x_halves = (2 * above.max(0) + i64::from(active_in_range)) as u128;
    let y_halves = (2 * below.max(0) + i64::from(active_in_range)) as u128;
    let per_half_x = if x_halves == 0 { 0 } else { u128::from(amount_x) / x_halves };
    let per_half_y = if y_halves == 0 { 0 } else { u128::from(amount_y) / y_halves };

    let mut allocations = Vec::with_capacity((upper - lower + 1).max(0) as usize);
    let mut placed_x = 0u128;
    let mut placed_y = 0u128;

    for bin_id in lower..=upper {
        let (x, y) = if bin_id > active_id {
            (per_half_x * 2, 0)
        } else if bin_id < active_id {
            (0, per_half_y * 2)
        } else {
            (per_half_x, per_half_y)
        };
        placed_x += x;
        placed_y += y;
        allocations.push(BinAllocation {
            bin_id,
            amount_x: x as u64,
            amount_y: y as u64,
        });
    }

    // Rounding dust goes to the bin closest to the active price.
    let dust_x = u128::from(amount_x).saturating_sub(placed_x) as u64;
    let dust_y = u128::from(amount_y).saturating_sub(placed_y) as u64;
    if dust_x > 0 {
        if let Some(bin) = allocations.iter_mut().find(|b| b.bin_id >= active_id) {
            bin.amount_x += dust_x;
        }
    }
    if dust_y > 0 {
        if let Some(bin) = allocations.iter_mut().rev().find(|b| b.bin_id <= active_id) {
            bin.amount_y += dust_y;
        }
    }

    allocations
}

/// Converts a slippage tolerance into the number of bins the active bin may
/// move before the deposit is rejected on-chain.
pub fn max_active_bin_slippage(slippage_bps: u16, bin_step: u16) -> i32 {
    if bin_step == 0 {
        return 0;
    }
    i32::from(slippage_bps.div_ceil(bin_step))
}
