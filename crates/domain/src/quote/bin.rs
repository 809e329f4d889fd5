//! Quotes for the bin model.

use super::{DepositQuote, PoolPricing, QuoteRequest, QuoteStrategy};
use crate::enums::TokenSide;
use crate::error::{DomainError, DomainResult};
use crate::math::bin_liquidity::{SpotInput, max_active_bin_slippage, spot_deposit};

/// Bin-model quoting for a spot-shaped deposit.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinQuote;

impl QuoteStrategy for BinQuote {
    fn deposit(&self, pool: &PoolPricing, request: &QuoteRequest) -> DomainResult<DepositQuote> {
        let input = match request.side {
            TokenSide::A => SpotInput::X(request.input_amount),
            TokenSide::B => SpotInput::Y(request.input_amount),
        };

        let deposit = spot_deposit(
            input,
            request.range.lower,
            request.range.upper,
            pool.current_index,
            pool.spacing_unit,
        )
        .map_err(DomainError::insufficient_input)?;

        if deposit.liquidity == 0 {
            return Err(DomainError::insufficient_input("amount too small to mint liquidity"));
        }

        let mut quote = DepositQuote::with_bounds(
            request.side,
            deposit.amount_x,
            deposit.amount_y,
            deposit.liquidity,
            request.slippage_bps,
        );
        quote.max_active_bin_slippage =
            Some(max_active_bin_slippage(request.slippage_bps, pool.spacing_unit));
        Ok(quote)
    }
}
