//! Quote engine.
//!
//! Given one token amount and a range, derives the counterpart amount and the
//! liquidity units at the pool's current price, then applies the slippage
//! tolerance to produce the bounds embedded in instructions. Amounts are
//! integer base units throughout; liquidity units are protocol-defined and
//! never rescaled outside this module.

mod bin;
mod tick;

pub use bin::BinQuote;
pub use tick::TickQuote;

use crate::enums::{AmmModel, TokenSide};
use crate::error::{DomainError, DomainResult};
use crate::math::slippage;
use crate::value_objects::Range;
use serde::{Deserialize, Serialize};

/// The slice of pool state the quote engine needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolPricing {
    /// Pool model.
    pub model: AmmModel,
    /// Bin step (bps) or tick spacing.
    pub spacing_unit: u16,
    /// Active bin id or current tick.
    pub current_index: i32,
    /// Exact Q64.64 sqrt price, when the pool stores one (tick model).
    pub sqrt_price_x64: Option<u128>,
}

/// A deposit quote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteRequest {
    /// Target range.
    pub range: Range,
    /// Amount supplied by the caller in base units.
    pub input_amount: u64,
    /// Which token `input_amount` refers to.
    pub side: TokenSide,
    /// Slippage tolerance in basis points.
    pub slippage_bps: u16,
}

/// Result of a deposit quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositQuote {
    /// Side the caller supplied.
    pub input_side: TokenSide,
    /// Expected token A deposit.
    pub amount_a: u64,
    /// Expected token B deposit.
    pub amount_b: u64,
    /// Liquidity units minted.
    pub liquidity: u128,
    /// Maximum token A the instruction may pull.
    pub max_amount_a: u64,
    /// Maximum token B the instruction may pull.
    pub max_amount_b: u64,
    /// Bin model only: how many bins the active bin may move.
    pub max_active_bin_slippage: Option<i32>,
}

impl DepositQuote {
    /// Derived amount of the token the caller did not supply.
    #[must_use]
    pub fn counterpart_amount(&self) -> u64 {
        match self.input_side {
            TokenSide::A => self.amount_b,
            TokenSide::B => self.amount_a,
        }
    }

    pub(crate) fn with_bounds(
        input_side: TokenSide,
        amount_a: u64,
        amount_b: u64,
        liquidity: u128,
        slippage_bps: u16,
    ) -> Self {
        Self {
            input_side,
            amount_a,
            amount_b,
            liquidity,
            max_amount_a: slippage::max_in(amount_a, slippage_bps),
            max_amount_b: slippage::max_in(amount_b, slippage_bps),
            max_active_bin_slippage: None,
        }
    }
}

/// Result of a withdrawal quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalQuote {
    /// Liquidity units removed.
    pub liquidity: u128,
    /// Expected token A received.
    pub amount_a: u64,
    /// Expected token B received.
    pub amount_b: u64,
    /// Minimum token A accepted.
    pub min_amount_a: u64,
    /// Minimum token B accepted.
    pub min_amount_b: u64,
}

/// Model-specific quoting.
pub trait QuoteStrategy {
    /// Quotes a deposit. `request` has already been validated.
    fn deposit(&self, pool: &PoolPricing, request: &QuoteRequest) -> DomainResult<DepositQuote>;
}

/// Quote engine dispatched on the pool model.
#[derive(Debug, Clone, Copy)]
pub enum QuoteEngine {
    /// Discretized-bin model.
    Bin(BinQuote),
    /// Tick-indexed model.
    Tick(TickQuote),
}

impl QuoteEngine {
    /// Returns the engine for a pool model.
    #[must_use]
    pub fn for_model(model: AmmModel) -> Self {
        match model {
            AmmModel::Bin => Self::Bin(BinQuote),
            AmmModel::Tick => Self::Tick(TickQuote),
        }
    }

    /// Quotes a deposit.
    ///
    /// # Errors
    /// `InvalidRange` if `lower >= upper`, `InsufficientInput` if the amount is
    /// zero or the supplied side cannot be deposited into the range.
    pub fn quote(&self, pool: &PoolPricing, request: &QuoteRequest) -> DomainResult<DepositQuote> {
        request.range.validated()?;
        if request.input_amount == 0 {
            return Err(DomainError::insufficient_input("input amount must be greater than zero"));
        }
        match self {
            Self::Bin(engine) => engine.deposit(pool, request),
            Self::Tick(engine) => engine.deposit(pool, request),
        }
    }
}

/// Quotes a deposit with the engine matching `pool.model`.
///
/// # Errors
/// See [`QuoteEngine::quote`].
pub fn quote(pool: &PoolPricing, request: &QuoteRequest) -> DomainResult<DepositQuote> {
    QuoteEngine::for_model(pool.model).quote(pool, request)
}
