//! Orca Whirlpool protocol adapter.
//!
//! This module provides functionality to interact with Orca Whirlpool pools:
//! - Decode pool and position accounts
//! - Encode LP instructions
//! - Derive position and tick array PDAs

/// Instruction encoders.
pub mod instructions;
/// Whirlpool account structures.
pub mod whirlpool;

use crate::state::{MintInfo, ModelExtras, PoolState, PositionSnapshot, RewardSlot, TokenMeta};
use clmm_builder_domain::enums::Protocol;
use clmm_builder_domain::value_objects::Range;
use solana_sdk::pubkey::Pubkey;
use whirlpool::{Whirlpool, WhirlpoolPosition};

/// Converts a decoded Whirlpool into a pool snapshot.
#[must_use]
pub fn pool_state(address: Pubkey, pool: &Whirlpool, mint_a: MintInfo, mint_b: MintInfo) -> PoolState {
    let rewards = pool
        .reward_infos
        .iter()
        .zip(0u8..)
        .map(|(info, index)| RewardSlot {
            index,
            mint: info.mint,
            vault: info.vault,
        })
        .collect();

    PoolState {
        address,
        protocol: Protocol::OrcaWhirlpools,
        spacing_unit: pool.tick_spacing,
        current_index: pool.tick_current_index,
        token_a: TokenMeta::new(pool.token_mint_a, pool.token_vault_a, mint_a),
        token_b: TokenMeta::new(pool.token_mint_b, pool.token_vault_b, mint_b),
        extras: ModelExtras::Tick {
            fee_rate: pool.fee_rate,
            sqrt_price_x64: pool.sqrt_price,
            liquidity: pool.liquidity,
        },
        rewards,
    }
}

/// Converts a decoded Position into a snapshot.
#[must_use]
pub fn position_snapshot(address: Pubkey, position: &WhirlpoolPosition) -> PositionSnapshot {
    PositionSnapshot {
        address,
        pool: position.whirlpool,
        protocol: Protocol::OrcaWhirlpools,
        owner: None,
        position_mint: Some(position.position_mint),
        range: Range::new(position.tick_lower_index, position.tick_upper_index),
        liquidity: position.liquidity,
        fees_owed_a: position.fee_owed_a,
        fees_owed_b: position.fee_owed_b,
        rewards_owed: position.reward_infos.iter().map(|r| r.amount_owed).collect(),
    }
}
