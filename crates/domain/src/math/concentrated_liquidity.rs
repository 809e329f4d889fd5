//! Liquidity math for the tick model, in Q64.64 sqrt-price space.
//!
//! All sqrt prices are `sqrt(P) * 2^64`. Intermediates use `U512` so that a
//! full `u128` liquidity times a full `u128` price delta cannot overflow.

use primitive_types::U512;

fn ordered(sqrt_price_a: u128, sqrt_price_b: u128) -> (U512, U512) {
    if sqrt_price_a < sqrt_price_b {
        (U512::from(sqrt_price_a), U512::from(sqrt_price_b))
    } else {
        (U512::from(sqrt_price_b), U512::from(sqrt_price_a))
    }
}

fn div_round(num: U512, den: U512, round_up: bool) -> U512 {
    let quotient = num / den;
    if round_up && !(num % den).is_zero() {
        quotient + U512::one()
    } else {
        quotient
    }
}

fn to_u64(value: U512) -> Result<u64, &'static str> {
    if value > U512::from(u64::MAX) {
        return Err("Overflow converting amount");
    }
    Ok(value.low_u64())
}

fn to_u128(value: U512) -> Result<u128, &'static str> {
    if value > U512::from(u128::MAX) {
        return Err("Overflow converting liquidity");
    }
    Ok(value.low_u128())
}

/// Calculates the amount of token A given liquidity and sqrt price range.
/// delta_a = L * (sqrt(P_b) - sqrt(P_a)) / (sqrt(P_a) * sqrt(P_b))
pub fn get_amount_a_delta(
    liquidity: u128,
    sqrt_price_a: u128,
    sqrt_price_b: u128,
    round_up: bool,
) -> Result<u64, &'static str> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    if lower.is_zero() {
        return Err("Sqrt price must be positive");
    }

    let num = (U512::from(liquidity) << 64) * (upper - lower);
    let den = lower * upper;
    to_u64(div_round(num, den, round_up))
}

/// Calculates the amount of token B given liquidity and sqrt price range.
/// delta_b = L * (sqrt(P_b) - sqrt(P_a))
pub fn get_amount_b_delta(
    liquidity: u128,
    sqrt_price_a: u128,
    sqrt_price_b: u128,
    round_up: bool,
) -> Result<u64, &'static str> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    let num = U512::from(liquidity) * (upper - lower);
    to_u64(div_round(num, U512::one() << 64, round_up))
}

/// Calculates liquidity for a given amount of token A and sqrt price range.
/// L = amount_a * sqrt(P_a) * sqrt(P_b) / (sqrt(P_b) - sqrt(P_a))
pub fn get_liquidity_for_amount_a(
    amount_a: u64,
    sqrt_price_a: u128,
    sqrt_price_b: u128,
) -> Result<u128, &'static str> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    let den = (upper - lower) << 64;
    if den.is_zero() {
        return Err("Range too small");
    }

    let num = U512::from(amount_a) * lower * upper;
    to_u128(num / den)
}

/// Calculates liquidity for a given amount of token B and sqrt price range.
/// L = amount_b / (sqrt(P_b) - sqrt(P_a))
pub fn get_liquidity_for_amount_b(
    amount_b: u64,
    sqrt_price_a: u128,
    sqrt_price_b: u128,
) -> Result<u128, &'static str> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    let den = upper - lower;
    if den.is_zero() {
        return Err("Range too small");
    }

    let num = U512::from(amount_b) << 64;
    to_u128(num / den)
}

/// Token amounts represented by `liquidity` in `[sqrt_lower, sqrt_upper]`
/// when the pool trades at `sqrt_current`.
pub fn get_amounts_for_liquidity(
    liquidity: u128,
    sqrt_current: u128,
    sqrt_lower: u128,
    sqrt_upper: u128,
    round_up: bool,
) -> Result<(u64, u64), &'static str> {
    if sqrt_current <= sqrt_lower {
        let a = get_amount_a_delta(liquidity, sqrt_lower, sqrt_upper, round_up)?;
        Ok((a, 0))
    } else if sqrt_current >= sqrt_upper {
        let b = get_amount_b_delta(liquidity, sqrt_lower, sqrt_upper, round_up)?;
        Ok((0, b))
    } else {
        let a = get_amount_a_delta(liquidity, sqrt_current, sqrt_upper, round_up)?;
        let b = get_amount_b_delta(liquidity, sqrt_lower, sqrt_current, round_up)?;
        Ok((a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: u128 = 1 << 64;

    #[test]
    fn test_amount_deltas() {
        // Price goes from 1 to 4 (sqrt: 1 to 2)
        // delta_b = 1000 * (2 - 1) = 1000
        // delta_a = 1000 * (1/1 - 1/2) = 500
        let liquidity = 1000u128;

        let db = get_amount_b_delta(liquidity, ONE, 2 * ONE, false).unwrap();
        assert_eq!(db, 1000);

        let da = get_amount_a_delta(liquidity, ONE, 2 * ONE, false).unwrap();
        assert_eq!(da, 500);

        // argument order does not matter
        assert_eq!(get_amount_a_delta(liquidity, 2 * ONE, ONE, false).unwrap(), 500);
    }

    #[test]
    fn test_rounding_direction() {
        // 3 * (2 - 1) / (1 * 2) = 1.5
        assert_eq!(get_amount_a_delta(3, ONE, 2 * ONE, false).unwrap(), 1);
        assert_eq!(get_amount_a_delta(3, ONE, 2 * ONE, true).unwrap(), 2);
    }

    #[test]
    fn test_get_liquidity() {
        let l = get_liquidity_for_amount_a(500, ONE, 2 * ONE).unwrap();
        assert_eq!(l, 1000);

        let l2 = get_liquidity_for_amount_b(1000, ONE, 2 * ONE).unwrap();
        assert_eq!(l2, 1000);

        assert!(get_liquidity_for_amount_b(1000, ONE, ONE).is_err());
    }

    #[test]
    fn test_amounts_for_liquidity_by_position() {
        // Current below range: only token A
        let (a, b) = get_amounts_for_liquidity(1000, ONE / 2, ONE, 2 * ONE, false).unwrap();
        assert_eq!((a, b), (500, 0));

        // Current above range: only token B
        let (a, b) = get_amounts_for_liquidity(1000, 3 * ONE, ONE, 2 * ONE, false).unwrap();
        assert_eq!((a, b), (0, 1000));

        // In range: both
        let (a, b) = get_amounts_for_liquidity(1000, ONE + ONE / 2, ONE, 2 * ONE, false).unwrap();
        assert!(a > 0 && b > 0);
        assert_eq!(b, 500);
    }
}
