//! Instruction composition.
//!
//! Turns an operation on a pool or position into an ordered instruction
//! plan. Each model has its own composer; [`InstructionComposer`] checks the
//! life-cycle preconditions and range alignment once, then dispatches.
//!
//! The close sequence is fixed: claim fees, claim every configured reward,
//! withdraw all liquidity when there is any, then close the account. Nothing
//! may be claimed after the account is gone, so the order is never changed.

mod bin;
mod tick;

pub use bin::BinComposer;
pub use tick::TickComposer;

use crate::error::{BuildError, BuildResult};
use crate::lifecycle::Operation;
use crate::plan::{InstructionPlan, PlanStep};
use clmm_builder_domain::enums::AmmModel;
use clmm_builder_domain::error::DomainError;
use clmm_builder_domain::math::price_tick::{MAX_TICK, MIN_TICK, is_aligned};
use clmm_builder_domain::quote::DepositQuote;
use clmm_builder_domain::range::MAX_BINS_PER_POSITION;
use clmm_builder_domain::value_objects::Range;
use clmm_builder_protocols::state::{PoolState, PositionSnapshot, RewardSlot};
use solana_sdk::pubkey::Pubkey;
use tracing::info;

/// Full withdrawal in basis points.
pub const FULL_WITHDRAWAL_BPS: u16 = 10_000;

/// An existing position together with its pool and the acting wallet.
#[derive(Debug, Clone, Copy)]
pub struct PositionContext<'a> {
    /// Pool the position belongs to.
    pub pool: &'a PoolState,
    /// Position as last read from chain.
    pub position: &'a PositionSnapshot,
    /// Wallet acting on the position; pays and receives.
    pub owner: Pubkey,
}

impl PositionContext<'_> {
    pub(crate) fn reward(&self, index: u8) -> BuildResult<&RewardSlot> {
        self.pool
            .rewards
            .iter()
            .find(|slot| slot.index == index)
            .ok_or_else(|| {
                BuildError::Domain(DomainError::not_found(format!("reward slot {index}")))
            })
    }
}

/// Model-specific instruction encoding.
pub trait PositionComposer {
    /// Creates a position over `range` and deposits `quote`.
    fn open(
        &self,
        pool: &PoolState,
        owner: &Pubkey,
        range: &Range,
        quote: &DepositQuote,
    ) -> BuildResult<InstructionPlan>;

    /// Deposits `quote` into an existing position.
    fn add(&self, ctx: &PositionContext<'_>, quote: &DepositQuote) -> BuildResult<InstructionPlan>;

    /// Withdraws `bps` of the position's liquidity.
    fn remove(
        &self,
        ctx: &PositionContext<'_>,
        bps: u16,
        slippage_bps: u16,
    ) -> BuildResult<InstructionPlan>;

    /// Claims swap fees.
    fn collect_fees(&self, ctx: &PositionContext<'_>) -> BuildResult<InstructionPlan>;

    /// Claims every configured reward.
    fn collect_rewards(&self, ctx: &PositionContext<'_>) -> BuildResult<InstructionPlan>;

    /// Harvests, withdraws and closes the position.
    fn close(&self, ctx: &PositionContext<'_>, slippage_bps: u16) -> BuildResult<InstructionPlan>;
}

/// The explicit close chain for a position.
///
/// Reward slots without a mint are skipped; the withdrawal is present only
/// when the position holds liquidity.
#[must_use]
pub fn close_sequence(liquidity: u128, rewards: &[RewardSlot]) -> Vec<PlanStep> {
    let mut steps = vec![PlanStep::ClaimFees];
    steps.extend(
        rewards
            .iter()
            .filter(|slot| slot.is_active())
            .map(|slot| PlanStep::ClaimReward { index: slot.index }),
    );
    if liquidity > 0 {
        steps.push(PlanStep::RemoveLiquidity {
            bps: FULL_WITHDRAWAL_BPS,
        });
    }
    steps.push(PlanStep::ClosePosition);
    steps
}

/// Rejects ranges the pool cannot hold.
///
/// # Errors
/// `InvalidRange` if `lower >= upper`, if tick bounds are not multiples of
/// the spacing or outside the tick domain, or if a bin range spans more
/// than the per-position bin limit.
pub fn validate_range(pool: &PoolState, range: &Range) -> BuildResult<()> {
    range.validated()?;
    match pool.model() {
        AmmModel::Tick => {
            for bound in [range.lower, range.upper] {
                if !is_aligned(bound, pool.spacing_unit) {
                    return Err(DomainError::invalid_range(format!(
                        "tick {bound} is not a multiple of spacing {}",
                        pool.spacing_unit
                    ))
                    .into());
                }
                if !(MIN_TICK..=MAX_TICK).contains(&bound) {
                    return Err(DomainError::invalid_range(format!("tick {bound} out of bounds")).into());
                }
            }
        }
        AmmModel::Bin => {
            let bins = range.width() + 1;
            if bins > i64::from(MAX_BINS_PER_POSITION) {
                return Err(DomainError::invalid_range(format!(
                    "{bins} bins exceeds the limit of {MAX_BINS_PER_POSITION}"
                ))
                .into());
            }
        }
    }
    Ok(())
}

fn ensure_owner(ctx: &PositionContext<'_>) -> BuildResult<()> {
    match ctx.position.owner {
        Some(owner) if owner != ctx.owner => Err(BuildError::NotOwner {
            owner: owner.to_string(),
            caller: ctx.owner.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Instruction composer dispatched on the pool model.
#[derive(Debug, Clone, Copy)]
pub enum InstructionComposer {
    /// Discretized-bin model.
    Bin(BinComposer),
    /// Tick-indexed model.
    Tick(TickComposer),
}

impl InstructionComposer {
    /// Returns the composer for a pool model.
    #[must_use]
    pub fn for_model(model: AmmModel) -> Self {
        match model {
            AmmModel::Bin => Self::Bin(BinComposer),
            AmmModel::Tick => Self::Tick(TickComposer),
        }
    }

    fn inner(&self) -> &dyn PositionComposer {
        match self {
            Self::Bin(composer) => composer,
            Self::Tick(composer) => composer,
        }
    }

    fn precheck(&self, operation: Operation, ctx: &PositionContext<'_>) -> BuildResult<()> {
        if ctx.position.pool != ctx.pool.address {
            return Err(DomainError::not_found(format!(
                "position {} in pool {}",
                ctx.position.address, ctx.pool.address
            ))
            .into());
        }
        operation.check(ctx.position)?;
        validate_range(ctx.pool, &ctx.position.range)?;
        ensure_owner(ctx)
    }

    /// Plans `open`.
    ///
    /// # Errors
    /// `InvalidRange` for a range the pool cannot hold.
    pub fn open(
        &self,
        pool: &PoolState,
        owner: &Pubkey,
        range: &Range,
        quote: &DepositQuote,
    ) -> BuildResult<InstructionPlan> {
        validate_range(pool, range)?;
        let plan = self.inner().open(pool, owner, range, quote)?;
        info!(
            pool = %pool.address,
            position = ?plan.position,
            range = %range,
            liquidity = quote.liquidity,
            "Composed open"
        );
        Ok(plan)
    }

    /// Plans `add`.
    ///
    /// # Errors
    /// Life-cycle violations and ranges the pool cannot hold.
    pub fn add(&self, ctx: &PositionContext<'_>, quote: &DepositQuote) -> BuildResult<InstructionPlan> {
        self.precheck(Operation::Add, ctx)?;
        let plan = self.inner().add(ctx, quote)?;
        info!(position = %ctx.position.address, liquidity = quote.liquidity, "Composed add");
        Ok(plan)
    }

    /// Plans a withdrawal of `bps` basis points.
    ///
    /// # Errors
    /// `InsufficientInput` for an empty position or `bps` outside `1..=10000`,
    /// `InvalidRange` for a position range the pool cannot hold.
    pub fn remove(
        &self,
        ctx: &PositionContext<'_>,
        bps: u16,
        slippage_bps: u16,
    ) -> BuildResult<InstructionPlan> {
        self.precheck(Operation::Remove, ctx)?;
        if bps == 0 || bps > FULL_WITHDRAWAL_BPS {
            return Err(DomainError::insufficient_input(format!(
                "bps must be within 1..={FULL_WITHDRAWAL_BPS}, got {bps}"
            ))
            .into());
        }
        let plan = self.inner().remove(ctx, bps, slippage_bps)?;
        info!(position = %ctx.position.address, bps, "Composed remove");
        Ok(plan)
    }

    /// Plans a fee claim.
    ///
    /// # Errors
    /// `InsufficientInput` when there is no liquidity and nothing owed.
    pub fn collect_fees(&self, ctx: &PositionContext<'_>) -> BuildResult<InstructionPlan> {
        self.precheck(Operation::CollectFees, ctx)?;
        let plan = self.inner().collect_fees(ctx)?;
        info!(position = %ctx.position.address, "Composed collect-fees");
        Ok(plan)
    }

    /// Plans reward claims for every configured slot.
    ///
    /// # Errors
    /// `InsufficientInput` when the pool has no configured reward, or when
    /// there is no liquidity and nothing owed.
    pub fn collect_rewards(&self, ctx: &PositionContext<'_>) -> BuildResult<InstructionPlan> {
        self.precheck(Operation::CollectRewards, ctx)?;
        let active = ctx.pool.active_rewards().count();
        if active == 0 {
            return Err(DomainError::insufficient_input(format!(
                "pool {} has no configured rewards",
                ctx.pool.address
            ))
            .into());
        }
        let plan = self.inner().collect_rewards(ctx)?;
        info!(position = %ctx.position.address, rewards = active, "Composed collect-rewards");
        Ok(plan)
    }

    /// Plans the close sequence.
    ///
    /// # Errors
    /// Life-cycle violations and misaligned position ranges; an empty
    /// position can always be closed.
    pub fn close(&self, ctx: &PositionContext<'_>, slippage_bps: u16) -> BuildResult<InstructionPlan> {
        self.precheck(Operation::Close, ctx)?;
        let plan = self.inner().close(ctx, slippage_bps)?;
        info!(
            position = %ctx.position.address,
            liquidity = ctx.position.liquidity,
            instructions = plan.len(),
            "Composed close"
        );
        Ok(plan)
    }
}
