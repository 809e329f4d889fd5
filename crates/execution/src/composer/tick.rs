//! Tick-model composer (Whirlpool instructions).
//!
//! Whirlpool positions are NFTs: opening mints a fresh position mint that
//! co-signs, and the position account is a PDA of that mint. Owed fees and
//! rewards are checkpointed with `update_fees_and_rewards` before any claim
//! on a funded position.
//!
//! Only the v1 instruction set is encoded, so both pool tokens must belong
//! to the legacy SPL token program.

use super::{FULL_WITHDRAWAL_BPS, PositionComposer, PositionContext, close_sequence};
use crate::error::{BuildError, BuildResult};
use crate::plan::{GeneratedKey, InstructionPlan, PlanStep};
use clmm_builder_domain::error::DomainError;
use clmm_builder_domain::quote::{DepositQuote, TickQuote};
use clmm_builder_domain::value_objects::Range;
use clmm_builder_protocols::accounts::TOKEN_PROGRAM_ID;
use clmm_builder_protocols::orca::instructions::{
    self as whirlpool, PositionAccounts, derive_position,
};
use clmm_builder_protocols::state::PoolState;
use solana_sdk::pubkey::Pubkey;

/// Composer for tick-model pools.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickComposer;

impl TickComposer {
    fn ensure_legacy_tokens(pool: &PoolState) -> BuildResult<()> {
        for token in [&pool.token_a, &pool.token_b] {
            if token.token_program != TOKEN_PROGRAM_ID {
                return Err(BuildError::UnsupportedTokenProgram {
                    mint: token.mint.to_string(),
                    program: token.token_program.to_string(),
                });
            }
        }
        Ok(())
    }

    fn accounts(ctx: &PositionContext<'_>) -> BuildResult<PositionAccounts> {
        Self::ensure_legacy_tokens(ctx.pool)?;
        let position = ctx.position;
        let mint = position.position_mint.ok_or_else(|| {
            DomainError::not_found(format!("position mint of {}", position.address))
        })?;
        let accounts = PositionAccounts::resolve(
            ctx.pool,
            mint,
            ctx.owner,
            position.range.lower,
            position.range.upper,
        );
        if accounts.position != position.address {
            return Err(DomainError::not_found(format!(
                "position {} does not derive from mint {mint}",
                position.address
            ))
            .into());
        }
        Ok(accounts)
    }

    fn checkpoint(ctx: &PositionContext<'_>, accounts: &PositionAccounts, plan: &mut InstructionPlan) {
        if ctx.position.is_funded() {
            plan.push(PlanStep::UpdateFees, whirlpool::update_fees_and_rewards(accounts));
        }
    }
}

impl PositionComposer for TickComposer {
    fn open(
        &self,
        pool: &PoolState,
        owner: &Pubkey,
        range: &Range,
        quote: &DepositQuote,
    ) -> BuildResult<InstructionPlan> {
        Self::ensure_legacy_tokens(pool)?;
        let mint = GeneratedKey::generate();
        let (position, bump) = derive_position(&mint.pubkey);
        let accounts = PositionAccounts::resolve(pool, mint.pubkey, *owner, range.lower, range.upper);

        let mut plan = InstructionPlan::for_position(position);
        plan.push(
            PlanStep::CreatePosition,
            whirlpool::open_position(&accounts, owner, bump, range.lower, range.upper),
        );
        plan.push(
            PlanStep::AddLiquidity,
            whirlpool::increase_liquidity(&accounts, quote.liquidity, quote.max_amount_a, quote.max_amount_b),
        );
        plan.add_co_signer(mint);
        Ok(plan)
    }

    fn add(&self, ctx: &PositionContext<'_>, quote: &DepositQuote) -> BuildResult<InstructionPlan> {
        let accounts = Self::accounts(ctx)?;
        let mut plan = InstructionPlan::for_position(ctx.position.address);
        plan.push(
            PlanStep::AddLiquidity,
            whirlpool::increase_liquidity(&accounts, quote.liquidity, quote.max_amount_a, quote.max_amount_b),
        );
        Ok(plan)
    }

    fn remove(
        &self,
        ctx: &PositionContext<'_>,
        bps: u16,
        slippage_bps: u16,
    ) -> BuildResult<InstructionPlan> {
        let accounts = Self::accounts(ctx)?;
        let withdrawal = TickQuote.withdrawal(
            &ctx.pool.pricing(),
            &ctx.position.range,
            ctx.position.liquidity,
            bps,
            slippage_bps,
        )?;

        let mut plan = InstructionPlan::for_position(ctx.position.address);
        plan.push(
            PlanStep::RemoveLiquidity { bps },
            whirlpool::decrease_liquidity(
                &accounts,
                withdrawal.liquidity,
                withdrawal.min_amount_a,
                withdrawal.min_amount_b,
            ),
        );
        plan.withdrawal = Some(withdrawal);
        Ok(plan)
    }

    fn collect_fees(&self, ctx: &PositionContext<'_>) -> BuildResult<InstructionPlan> {
        let accounts = Self::accounts(ctx)?;
        let mut plan = InstructionPlan::for_position(ctx.position.address);
        Self::checkpoint(ctx, &accounts, &mut plan);
        plan.push(PlanStep::ClaimFees, whirlpool::collect_fees(&accounts));
        Ok(plan)
    }

    fn collect_rewards(&self, ctx: &PositionContext<'_>) -> BuildResult<InstructionPlan> {
        let accounts = Self::accounts(ctx)?;
        let mut plan = InstructionPlan::for_position(ctx.position.address);
        Self::checkpoint(ctx, &accounts, &mut plan);
        for slot in ctx.pool.active_rewards() {
            plan.push(
                PlanStep::ClaimReward { index: slot.index },
                whirlpool::collect_reward(&accounts, slot),
            );
        }
        Ok(plan)
    }

    fn close(&self, ctx: &PositionContext<'_>, slippage_bps: u16) -> BuildResult<InstructionPlan> {
        let accounts = Self::accounts(ctx)?;
        let mut plan = InstructionPlan::for_position(ctx.position.address);
        Self::checkpoint(ctx, &accounts, &mut plan);

        for step in close_sequence(ctx.position.liquidity, &ctx.pool.rewards) {
            let instruction = match step {
                PlanStep::ClaimFees => whirlpool::collect_fees(&accounts),
                PlanStep::ClaimReward { index } => whirlpool::collect_reward(&accounts, ctx.reward(index)?),
                PlanStep::RemoveLiquidity { .. } => {
                    let withdrawal = TickQuote.withdrawal(
                        &ctx.pool.pricing(),
                        &ctx.position.range,
                        ctx.position.liquidity,
                        FULL_WITHDRAWAL_BPS,
                        slippage_bps,
                    )?;
                    let instruction = whirlpool::decrease_liquidity(
                        &accounts,
                        withdrawal.liquidity,
                        withdrawal.min_amount_a,
                        withdrawal.min_amount_b,
                    );
                    plan.withdrawal = Some(withdrawal);
                    instruction
                }
                _ => whirlpool::close_position(&accounts, &ctx.owner),
            };
            plan.push(step, instruction);
        }
        Ok(plan)
    }
}
