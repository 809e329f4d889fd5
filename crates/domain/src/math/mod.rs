//! Price and liquidity math for both pool models.

/// Spot liquidity distribution across bins.
pub mod bin_liquidity;
/// Q64.64 liquidity math for ticks.
pub mod concentrated_liquidity;
/// Bin id <-> price conversion.
pub mod price_bin;
/// Tick <-> price conversion.
pub mod price_tick;
/// Slippage bounds.
pub mod slippage;
