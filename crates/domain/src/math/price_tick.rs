use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Lowest tick supported by the tick-model program.
pub const MIN_TICK: i32 = -443_636;
/// Highest tick supported by the tick-model program.
pub const MAX_TICK: i32 = 443_636;

/// Price ratio between two adjacent ticks.
pub const TICK_BASE: f64 = 1.0001;

/// `2^64` as a float, used to move between Q64.64 and real values.
const Q64: f64 = 18_446_744_073_709_551_616.0;

/// Returns the price corresponding to a given tick.
/// P = 1.0001 ^ tick
pub fn tick_to_price(tick: i32) -> Result<Decimal, &'static str> {
    let price_f64 = TICK_BASE.powi(tick);
    Decimal::from_f64(price_f64).ok_or("Overflow converting price")
}

/// Returns the tick corresponding to a given price.
/// tick = log_1.0001(P)
pub fn price_to_tick(price: Decimal) -> Result<i32, &'static str> {
    if price <= Decimal::ZERO {
        return Err("Price must be positive");
    }
    let price_f64 = price.to_f64().ok_or("Overflow converting price")?;
    let tick = price_f64.log(TICK_BASE);
    Ok(tick.round() as i32)
}

/// Returns `sqrt(1.0001^tick)` as a Q64.64 fixed-point value.
///
/// Computed in `f64`, so the result carries ~53 bits of precision. Good enough
/// for quoting; the program recomputes exact values on-chain.
pub fn sqrt_price_x64_at_tick(tick: i32) -> Result<u128, &'static str> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err("Tick out of bounds");
    }
    let sqrt_price = TICK_BASE.powf(f64::from(tick) / 2.0);
    let scaled = sqrt_price * Q64;
    if !scaled.is_finite() || scaled >= u128::MAX as f64 {
        return Err("Overflow converting sqrt price");
    }
    Ok(scaled as u128)
}

/// Converts a Q64.64 sqrt price into a raw (base unit) price of B per A.
pub fn sqrt_price_x64_to_price(sqrt_price_x64: u128) -> Result<Decimal, &'static str> {
    let sqrt_price = sqrt_price_x64 as f64 / Q64;
    Decimal::from_f64(sqrt_price * sqrt_price).ok_or("Overflow converting price")
}

/// Floors `tick` to the nearest multiple of `spacing` at or below it.
///
/// Negative ticks floor towards negative infinity, so the result is always
/// `<= tick`.
pub fn align_tick_down(tick: i32, spacing: u16) -> i32 {
    let spacing = i32::from(spacing.max(1));
    tick.div_euclid(spacing) * spacing
}

/// Returns true if `tick` is a multiple of `spacing`.
pub fn is_aligned(tick: i32, spacing: u16) -> bool {
    tick.rem_euclid(i32::from(spacing.max(1))) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_to_price() {
        // Tick 0 -> Price 1
        let p = tick_to_price(0).unwrap();
        assert_eq!(p, Decimal::from(1));

        // Tick 100 -> 1.0001^100 ~= 1.010049
        let p100 = tick_to_price(100).unwrap();
        let expected = 1.01004966;
        let diff = (p100.to_f64().unwrap() - expected).abs();
        assert!(diff < 0.000001);
    }

    #[test]
    fn test_price_to_tick() {
        let t = price_to_tick(Decimal::from(1)).unwrap();
        assert_eq!(t, 0);

        let t2 = price_to_tick(Decimal::from_f64(1.01004966).unwrap()).unwrap();
        assert_eq!(t2, 100);

        assert!(price_to_tick(Decimal::ZERO).is_err());
    }

    #[test]
    fn test_price_round_trip_within_one_tick() {
        for tick in [-50_000, -1234, -1, 0, 1, 777, 64_000] {
            let price = tick_to_price(tick).unwrap();
            let back = price_to_tick(price).unwrap();
            assert!((back - tick).abs() <= 1, "tick {tick} came back as {back}");
        }
    }

    #[test]
    fn test_sqrt_price_at_zero_tick() {
        let sqrt = sqrt_price_x64_at_tick(0).unwrap();
        assert_eq!(sqrt, 1u128 << 64);
        assert!(sqrt_price_x64_at_tick(MAX_TICK + 1).is_err());
    }

    #[test]
    fn test_sqrt_price_to_price() {
        let price = sqrt_price_x64_to_price(2u128 << 64).unwrap();
        assert_eq!(price, Decimal::from(4));
    }

    #[test]
    fn test_align_tick_down() {
        assert_eq!(align_tick_down(130, 64), 128);
        assert_eq!(align_tick_down(128, 64), 128);
        assert_eq!(align_tick_down(-1, 64), -64);
        assert_eq!(align_tick_down(-64, 64), -64);
        assert!(is_aligned(-128, 64));
        assert!(!is_aligned(-127, 64));
    }
}
