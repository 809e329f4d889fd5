use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Bin id whose price is exactly 1.
pub const ZERO_PRICE_BIN_ID: i32 = 1 << 23;

/// Basis points denominator used by bin steps.
pub const BASIS_POINT_MAX: u32 = 10_000;

/// `2^64` as a float, used to express bin prices as Q64.64.
const Q64: f64 = 18_446_744_073_709_551_616.0;

fn bin_base(bin_step: u16) -> f64 {
    1.0 + f64::from(bin_step) / f64::from(BASIS_POINT_MAX)
}

/// Returns the price of a bin as a float.
/// P = (1 + bin_step / 10000) ^ (bin_id - ZERO_PRICE_BIN_ID)
pub fn bin_to_price_f64(bin_id: i32, bin_step: u16) -> f64 {
    bin_base(bin_step).powi(bin_id - ZERO_PRICE_BIN_ID)
}

/// Returns the price of a bin.
pub fn bin_to_price(bin_id: i32, bin_step: u16) -> Result<Decimal, &'static str> {
    if bin_step == 0 {
        return Err("Bin step must be positive");
    }
    Decimal::from_f64(bin_to_price_f64(bin_id, bin_step)).ok_or("Overflow converting price")
}

/// Returns the bin id whose price is closest to `price`.
pub fn price_to_bin(price: Decimal, bin_step: u16) -> Result<i32, &'static str> {
    if bin_step == 0 {
        return Err("Bin step must be positive");
    }
    if price <= Decimal::ZERO {
        return Err("Price must be positive");
    }
    let price_f64 = price.to_f64().ok_or("Overflow converting price")?;
    let offset = price_f64.ln() / bin_base(bin_step).ln();
    Ok(offset.round() as i32 + ZERO_PRICE_BIN_ID)
}

/// Returns the price of a bin as a Q64.64 fixed-point value.
pub fn bin_price_x64(bin_id: i32, bin_step: u16) -> Result<u128, &'static str> {
    let scaled = bin_to_price_f64(bin_id, bin_step) * Q64;
    if !scaled.is_finite() || scaled >= u128::MAX as f64 {
        return Err("Overflow converting bin price");
    }
    Ok(scaled as u128)
}
