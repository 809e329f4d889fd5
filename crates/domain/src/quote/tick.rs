//! Quotes for the tick model.

use super::{DepositQuote, PoolPricing, QuoteRequest, QuoteStrategy, WithdrawalQuote};
use crate::enums::TokenSide;
use crate::error::{DomainError, DomainResult};
use crate::math::concentrated_liquidity::{
    get_amount_a_delta, get_amount_b_delta, get_amounts_for_liquidity, get_liquidity_for_amount_a,
    get_liquidity_for_amount_b,
};
use crate::math::price_tick::sqrt_price_x64_at_tick;
use crate::math::slippage;
use crate::value_objects::Range;

/// Tick-model quoting over Q64.64 sqrt prices.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickQuote;

fn range_sqrt_prices(range: &Range) -> DomainResult<(u128, u128)> {
    let lower = sqrt_price_x64_at_tick(range.lower)
        .map_err(|e| DomainError::invalid_range(format!("lower tick {}: {e}", range.lower)))?;
    let upper = sqrt_price_x64_at_tick(range.upper)
        .map_err(|e| DomainError::invalid_range(format!("upper tick {}: {e}", range.upper)))?;
    Ok((lower, upper))
}

fn current_sqrt_price(pool: &PoolPricing) -> DomainResult<u128> {
    match pool.sqrt_price_x64 {
        Some(sqrt) => Ok(sqrt),
        None => sqrt_price_x64_at_tick(pool.current_index)
            .map_err(|e| DomainError::invalid_range(format!("current tick: {e}"))),
    }
}

fn amount_err(e: &'static str) -> DomainError {
    DomainError::insufficient_input(e)
}

impl TickQuote {
    /// Quotes removing `bps` of `liquidity` from a position over `range`.
    ///
    /// # Errors
    /// `InvalidRange` for a degenerate range, `InsufficientInput` when there is
    /// nothing to withdraw.
    pub fn withdrawal(
        &self,
        pool: &PoolPricing,
        range: &Range,
        liquidity: u128,
        bps: u16,
        slippage_bps: u16,
    ) -> DomainResult<WithdrawalQuote> {
        range.validated()?;
        let removed = liquidity.saturating_mul(u128::from(bps.min(10_000))) / 10_000;
        if removed == 0 {
            return Err(DomainError::insufficient_input("no liquidity to withdraw"));
        }

        let (sqrt_lower, sqrt_upper) = range_sqrt_prices(range)?;
        let sqrt_current = current_sqrt_price(pool)?;
        let (amount_a, amount_b) =
            get_amounts_for_liquidity(removed, sqrt_current, sqrt_lower, sqrt_upper, false)
                .map_err(amount_err)?;

        Ok(WithdrawalQuote {
            liquidity: removed,
            amount_a,
            amount_b,
            min_amount_a: slippage::min_out(amount_a, slippage_bps),
            min_amount_b: slippage::min_out(amount_b, slippage_bps),
        })
    }
}

impl QuoteStrategy for TickQuote {
    fn deposit(&self, pool: &PoolPricing, request: &QuoteRequest) -> DomainResult<DepositQuote> {
        let (sqrt_lower, sqrt_upper) = range_sqrt_prices(&request.range)?;
        let sqrt_current = current_sqrt_price(pool)?;
        let amount = request.input_amount;

        let liquidity = match request.side {
            TokenSide::A => {
                if sqrt_current >= sqrt_upper {
                    return Err(DomainError::insufficient_input(
                        "token A cannot be deposited into a range below the current price",
                    ));
                }
                let from = sqrt_current.max(sqrt_lower);
                get_liquidity_for_amount_a(amount, from, sqrt_upper).map_err(amount_err)?
            }
            TokenSide::B => {
                if sqrt_current <= sqrt_lower {
                    return Err(DomainError::insufficient_input(
                        "token B cannot be deposited into a range above the current price",
                    ));
                }
                let to = sqrt_current.min(sqrt_upper);
                get_liquidity_for_amount_b(amount, sqrt_lower, to).map_err(amount_err)?
            }
        };

        if liquidity == 0 {
            return Err(DomainError::insufficient_input("amount too small to mint liquidity"));
        }

        let (amount_a, amount_b) = if sqrt_current <= sqrt_lower {
            let a = get_amount_a_delta(liquidity, sqrt_lower, sqrt_upper, true).map_err(amount_err)?;
            (a, 0)
        } else if sqrt_current >= sqrt_upper {
            let b = get_amount_b_delta(liquidity, sqrt_lower, sqrt_upper, true).map_err(amount_err)?;
            (0, b)
        } else {
            get_amounts_for_liquidity(liquidity, sqrt_current, sqrt_lower, sqrt_upper, true)
                .map_err(amount_err)?
        };

        Ok(DepositQuote::with_bounds(
            request.side,
            amount_a,
            amount_b,
            liquidity,
            request.slippage_bps,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::AmmModel;

    fn pool_at(tick: i32) -> PoolPricing {
        PoolPricing {
            model: AmmModel::Tick,
            spacing_unit: 64,
            current_index: tick,
            sqrt_price_x64: None,
        }
    }

    fn request(range: Range, amount: u64, side: TokenSide) -> QuoteRequest {
        QuoteRequest {
            range,
            input_amount: amount,
            side,
            slippage_bps: 100,
        }
    }

    #[test]
    fn test_symmetric_range_is_roughly_balanced() {
        let quote = TickQuote
            .deposit(&pool_at(0), &request(Range::new(-640, 640), 1_000_000, TokenSide::A))
            .unwrap();
        // At price 1 with a symmetric range both sides are nearly equal
        let diff = quote.amount_a.abs_diff(quote.amount_b);
        assert!(diff < 1_000, "a={} b={}", quote.amount_a, quote.amount_b);
        assert!(quote.amount_a >= 999_999 && quote.amount_a <= 1_000_001);
        assert!(quote.liquidity > 0);
        assert!(quote.max_amount_a > quote.amount_a);
        assert_eq!(quote.counterpart_amount(), quote.amount_b);
    }

    #[test]
    fn test_side_b_mirror() {
        let quote = TickQuote
            .deposit(&pool_at(0), &request(Range::new(-640, 640), 1_000_000, TokenSide::B))
            .unwrap();
        assert!(quote.amount_b >= 999_999 && quote.amount_b <= 1_000_001);
        assert_eq!(quote.counterpart_amount(), quote.amount_a);
    }

    #[test]
    fn test_range_above_price_needs_only_a() {
        let quote = TickQuote
            .deposit(&pool_at(0), &request(Range::new(64, 640), 1_000_000, TokenSide::A))
            .unwrap();
        assert_eq!(quote.amount_b, 0);
        assert_eq!(quote.max_amount_b, 0);

        let err = TickQuote
            .deposit(&pool_at(0), &request(Range::new(64, 640), 1_000_000, TokenSide::B))
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientInput(_)));
    }

    #[test]
    fn test_range_below_price_rejects_a() {
        let err = TickQuote
            .deposit(&pool_at(0), &request(Range::new(-640, -64), 1_000_000, TokenSide::A))
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientInput(_)));
    }

    #[test]
    fn test_withdrawal_bounds() {
        let pool = pool_at(0);
        let range = Range::new(-640, 640);
        let full = TickQuote.withdrawal(&pool, &range, 1_000_000_000, 10_000, 50).unwrap();
        let half = TickQuote.withdrawal(&pool, &range, 1_000_000_000, 5_000, 50).unwrap();
        assert_eq!(half.liquidity, 500_000_000);
        assert!(full.amount_a > 0 && full.amount_b > 0);
        assert!(full.min_amount_a < full.amount_a);
        assert!(half.amount_a <= full.amount_a / 2 + 1);

        assert!(TickQuote.withdrawal(&pool, &range, 0, 10_000, 50).is_err());
    }
}
