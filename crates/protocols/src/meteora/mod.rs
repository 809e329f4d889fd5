//! Meteora DLMM protocol adapter.

/// Instruction encoders.
pub mod instructions;
/// LbPair and position account structures.
pub mod lb_pair;

use crate::state::{MintInfo, ModelExtras, PoolState, PositionSnapshot, RewardSlot, TokenMeta};
use clmm_builder_domain::enums::Protocol;
use clmm_builder_domain::value_objects::Range;
use lb_pair::{DlmmPosition, LbPair};
use solana_sdk::pubkey::Pubkey;

/// Converts a decoded LbPair into a pool snapshot.
#[must_use]
pub fn pool_state(address: Pubkey, pair: &LbPair, mint_x: MintInfo, mint_y: MintInfo) -> PoolState {
    let rewards = pair
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
        protocol: Protocol::MeteoraDlmm,
        spacing_unit: pair.bin_step,
        current_index: pair.active_id,
        token_a: TokenMeta::new(pair.token_x_mint, pair.reserve_x, mint_x),
        token_b: TokenMeta::new(pair.token_y_mint, pair.reserve_y, mint_y),
        extras: ModelExtras::Bin {
            base_factor: pair.base_factor,
            oracle: pair.oracle,
        },
        rewards,
    }
}

/// Converts a decoded position into a snapshot.
#[must_use]
pub fn position_snapshot(address: Pubkey, position: &DlmmPosition) -> PositionSnapshot {
    PositionSnapshot {
        address,
        pool: position.lb_pair,
        protocol: Protocol::MeteoraDlmm,
        owner: Some(position.owner),
        position_mint: None,
        range: Range::new(position.lower_bin_id, position.upper_bin_id),
        liquidity: position.total_liquidity,
        fees_owed_a: position.fee_x_pending,
        fees_owed_b: position.fee_y_pending,
        rewards_owed: position.reward_pendings.to_vec(),
    }
}
