//! Bin-model composer (DLMM instructions).
//!
//! DLMM positions are plain accounts created from a generated keypair and
//! owned by the wallet recorded inside them. Closing emits the explicit
//! claim, withdraw and close chain.

use super::{PositionComposer, PositionContext, close_sequence};
use crate::error::BuildResult;
use crate::plan::{GeneratedKey, InstructionPlan, PlanStep};
use clmm_builder_domain::quote::DepositQuote;
use clmm_builder_domain::value_objects::Range;
use clmm_builder_protocols::meteora::instructions::{self as dlmm, AddLiquidityArgs, PositionAccounts};
use clmm_builder_protocols::state::PoolState;
use solana_sdk::pubkey::Pubkey;

/// Composer for bin-model pools.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinComposer;

impl BinComposer {
    fn accounts(ctx: &PositionContext<'_>) -> PositionAccounts {
        let range = ctx.position.range;
        PositionAccounts::resolve(ctx.pool, ctx.position.address, ctx.owner, range.lower, range.upper)
    }

    fn deposit_args(pool: &PoolState, range: &Range, quote: &DepositQuote) -> AddLiquidityArgs {
        AddLiquidityArgs {
            amount_x: quote.amount_a,
            amount_y: quote.amount_b,
            active_id: pool.current_index,
            max_active_bin_slippage: quote.max_active_bin_slippage.unwrap_or_default(),
            min_bin_id: range.lower,
            max_bin_id: range.upper,
        }
    }
}

impl PositionComposer for BinComposer {
    fn open(
        &self,
        pool: &PoolState,
        owner: &Pubkey,
        range: &Range,
        quote: &DepositQuote,
    ) -> BuildResult<InstructionPlan> {
        let key = GeneratedKey::generate();
        let accounts = PositionAccounts::resolve(pool, key.pubkey, *owner, range.lower, range.upper);
        let width = range.upper - range.lower + 1;

        let mut plan = InstructionPlan::for_position(key.pubkey);
        plan.push(
            PlanStep::CreatePosition,
            dlmm::initialize_position(&accounts, owner, range.lower, width),
        );
        plan.push(
            PlanStep::AddLiquidity,
            dlmm::add_liquidity_by_strategy(&accounts, &Self::deposit_args(pool, range, quote)),
        );
        plan.add_co_signer(key);
        Ok(plan)
    }

    fn add(&self, ctx: &PositionContext<'_>, quote: &DepositQuote) -> BuildResult<InstructionPlan> {
        let accounts = Self::accounts(ctx);
        let mut plan = InstructionPlan::for_position(ctx.position.address);
        plan.push(
            PlanStep::AddLiquidity,
            dlmm::add_liquidity_by_strategy(&accounts, &Self::deposit_args(ctx.pool, &ctx.position.range, quote)),
        );
        Ok(plan)
    }

    fn remove(
        &self,
        ctx: &PositionContext<'_>,
        bps: u16,
        _slippage_bps: u16,
    ) -> BuildResult<InstructionPlan> {
        let accounts = Self::accounts(ctx);
        let range = ctx.position.range;
        let mut plan = InstructionPlan::for_position(ctx.position.address);
        plan.push(
            PlanStep::RemoveLiquidity { bps },
            dlmm::remove_liquidity_by_range(&accounts, range.lower, range.upper, bps),
        );
        Ok(plan)
    }

    fn collect_fees(&self, ctx: &PositionContext<'_>) -> BuildResult<InstructionPlan> {
        let accounts = Self::accounts(ctx);
        let mut plan = InstructionPlan::for_position(ctx.position.address);
        plan.push(PlanStep::ClaimFees, dlmm::claim_fee(&accounts));
        Ok(plan)
    }

    fn collect_rewards(&self, ctx: &PositionContext<'_>) -> BuildResult<InstructionPlan> {
        let accounts = Self::accounts(ctx);
        let mut plan = InstructionPlan::for_position(ctx.position.address);
        for slot in ctx.pool.active_rewards() {
            plan.push(
                PlanStep::ClaimReward { index: slot.index },
                dlmm::claim_reward(&accounts, slot),
            );
        }
        Ok(plan)
    }

    fn close(&self, ctx: &PositionContext<'_>, _slippage_bps: u16) -> BuildResult<InstructionPlan> {
        let accounts = Self::accounts(ctx);
        let range = ctx.position.range;
        let mut plan = InstructionPlan::for_position(ctx.position.address);

        for step in close_sequence(ctx.position.liquidity, &ctx.pool.rewards) {
            let instruction = match step {
                PlanStep::ClaimFees => dlmm::claim_fee(&accounts),
                PlanStep::ClaimReward { index } => dlmm::claim_reward(&accounts, ctx.reward(index)?),
                PlanStep::RemoveLiquidity { bps } => {
                    dlmm::remove_liquidity_by_range(&accounts, range.lower, range.upper, bps)
                }
                _ => dlmm::close_position(&accounts, &ctx.owner),
            };
            plan.push(step, instruction);
        }
        Ok(plan)
    }
}
