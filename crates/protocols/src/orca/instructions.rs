//! Whirlpool instruction encoders and PDAs.
//!
//! Every builder is pure: it takes already-resolved addresses and returns an
//! `Instruction`. Nothing here touches the network.

use crate::accounts::{
    ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID, WHIRLPOOL_PROGRAM_ID,
    derive_ata, with_discriminator,
};
use crate::state::{PoolState, RewardSlot};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

/// Ticks stored per tick array.
pub const TICK_ARRAY_SIZE: i32 = 88;

const OPEN_POSITION: [u8; 8] = [135, 128, 47, 77, 15, 152, 240, 49];
const INCREASE_LIQUIDITY: [u8; 8] = [46, 156, 243, 118, 13, 205, 251, 178];
const DECREASE_LIQUIDITY: [u8; 8] = [160, 38, 208, 111, 104, 91, 44, 1];
const UPDATE_FEES_AND_REWARDS: [u8; 8] = [154, 230, 250, 13, 236, 209, 75, 223];
const COLLECT_FEES: [u8; 8] = [164, 152, 207, 99, 30, 186, 19, 182];
const COLLECT_REWARD: [u8; 8] = [70, 5, 132, 87, 86, 235, 177, 34];
const CLOSE_POSITION: [u8; 8] = [123, 134, 81, 0, 49, 68, 98, 98];

/// Derives the position PDA for a position mint. Returns `(address, bump)`.
#[must_use]
pub fn derive_position(position_mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"position", position_mint.as_ref()], &WHIRLPOOL_PROGRAM_ID)
}

/// Start tick of the array containing `tick`.
#[must_use]
pub fn tick_array_start_index(tick: i32, tick_spacing: u16) -> i32 {
    let ticks_per_array = i32::from(tick_spacing.max(1)) * TICK_ARRAY_SIZE;
    tick.div_euclid(ticks_per_array) * ticks_per_array
}

/// Derives the tick array PDA covering `tick`.
#[must_use]
pub fn derive_tick_array(whirlpool: &Pubkey, tick: i32, tick_spacing: u16) -> Pubkey {
    let start = tick_array_start_index(tick, tick_spacing).to_string();
    Pubkey::find_program_address(
        &[b"tick_array", whirlpool.as_ref(), start.as_bytes()],
        &WHIRLPOOL_PROGRAM_ID,
    )
    .0
}

/// Addresses shared by every instruction acting on one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionAccounts {
    pub whirlpool: Pubkey,
    pub position: Pubkey,
    pub position_mint: Pubkey,
    pub position_token_account: Pubkey,
    pub authority: Pubkey,
    pub owner_token_a: Pubkey,
    pub owner_token_b: Pubkey,
    pub vault_a: Pubkey,
    pub vault_b: Pubkey,
    pub tick_array_lower: Pubkey,
    pub tick_array_upper: Pubkey,
}

impl PositionAccounts {
    /// Resolves all addresses for `authority`'s position over `[tick_lower, tick_upper]`.
    #[must_use]
    pub fn resolve(
        pool: &PoolState,
        position_mint: Pubkey,
        authority: Pubkey,
        tick_lower: i32,
        tick_upper: i32,
    ) -> Self {
        Self {
            whirlpool: pool.address,
            position: derive_position(&position_mint).0,
            position_mint,
            position_token_account: derive_ata(&authority, &position_mint, &TOKEN_PROGRAM_ID),
            authority,
            owner_token_a: derive_ata(&authority, &pool.token_a.mint, &pool.token_a.token_program),
            owner_token_b: derive_ata(&authority, &pool.token_b.mint, &pool.token_b.token_program),
            vault_a: pool.token_a.vault,
            vault_b: pool.token_b.vault,
            tick_array_lower: derive_tick_array(&pool.address, tick_lower, pool.spacing_unit),
            tick_array_upper: derive_tick_array(&pool.address, tick_upper, pool.spacing_unit),
        }
    }

    fn liquidity_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.whirlpool, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(self.authority, true),
            AccountMeta::new(self.position, false),
            AccountMeta::new_readonly(self.position_token_account, false),
            AccountMeta::new(self.owner_token_a, false),
            AccountMeta::new(self.owner_token_b, false),
            AccountMeta::new(self.vault_a, false),
            AccountMeta::new(self.vault_b, false),
            AccountMeta::new(self.tick_array_lower, false),
            AccountMeta::new(self.tick_array_upper, false),
        ]
    }
}

/// `open_position`: mints the position NFT and creates the position account.
///
/// `funder` pays rent and the generated `position_mint` must co-sign.
#[must_use]
pub fn open_position(
    accounts: &PositionAccounts,
    funder: &Pubkey,
    position_bump: u8,
    tick_lower: i32,
    tick_upper: i32,
) -> Instruction {
    let mut data = with_discriminator(OPEN_POSITION, 9);
    data.push(position_bump);
    data.extend_from_slice(&tick_lower.to_le_bytes());
    data.extend_from_slice(&tick_upper.to_le_bytes());

    Instruction {
        program_id: WHIRLPOOL_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*funder, true),
            AccountMeta::new_readonly(accounts.authority, false),
            AccountMeta::new(accounts.position, false),
            AccountMeta::new(accounts.position_mint, true),
            AccountMeta::new(accounts.position_token_account, false),
            AccountMeta::new_readonly(accounts.whirlpool, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(solana_sdk::sysvar::rent::ID, false),
            AccountMeta::new_readonly(ASSOCIATED_TOKEN_PROGRAM_ID, false),
        ],
        data,
    }
}

/// `increase_liquidity`.
#[must_use]
pub fn increase_liquidity(
    accounts: &PositionAccounts,
    liquidity: u128,
    token_max_a: u64,
    token_max_b: u64,
) -> Instruction {
    let mut data = with_discriminator(INCREASE_LIQUIDITY, 32);
    data.extend_from_slice(&liquidity.to_le_bytes());
    data.extend_from_slice(&token_max_a.to_le_bytes());
    data.extend_from_slice(&token_max_b.to_le_bytes());

    Instruction {
        program_id: WHIRLPOOL_PROGRAM_ID,
        accounts: accounts.liquidity_metas(),
        data,
    }
}

/// `decrease_liquidity`.
#[must_use]
pub fn decrease_liquidity(
    accounts: &PositionAccounts,
    liquidity: u128,
    token_min_a: u64,
    token_min_b: u64,
) -> Instruction {
    let mut data = with_discriminator(DECREASE_LIQUIDITY, 32);
    data.extend_from_slice(&liquidity.to_le_bytes());
    data.extend_from_slice(&token_min_a.to_le_bytes());
    data.extend_from_slice(&token_min_b.to_le_bytes());

    Instruction {
        program_id: WHIRLPOOL_PROGRAM_ID,
        accounts: accounts.liquidity_metas(),
        data,
    }
}

/// `update_fees_and_rewards`: checkpoints owed fees and rewards on a funded position.
#[must_use]
pub fn update_fees_and_rewards(accounts: &PositionAccounts) -> Instruction {
    Instruction {
        program_id: WHIRLPOOL_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(accounts.whirlpool, false),
            AccountMeta::new(accounts.position, false),
            AccountMeta::new_readonly(accounts.tick_array_lower, false),
            AccountMeta::new_readonly(accounts.tick_array_upper, false),
        ],
        data: UPDATE_FEES_AND_REWARDS.to_vec(),
    }
}

/// `collect_fees`.
#[must_use]
pub fn collect_fees(accounts: &PositionAccounts) -> Instruction {
    Instruction {
        program_id: WHIRLPOOL_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new_readonly(accounts.whirlpool, false),
            AccountMeta::new_readonly(accounts.authority, true),
            AccountMeta::new(accounts.position, false),
            AccountMeta::new_readonly(accounts.position_token_account, false),
            AccountMeta::new(accounts.owner_token_a, false),
            AccountMeta::new(accounts.vault_a, false),
            AccountMeta::new(accounts.owner_token_b, false),
            AccountMeta::new(accounts.vault_b, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: COLLECT_FEES.to_vec(),
    }
}

/// `collect_reward` for one reward slot.
#[must_use]
pub fn collect_reward(accounts: &PositionAccounts, reward: &RewardSlot) -> Instruction {
    let mut data = with_discriminator(COLLECT_REWARD, 1);
    data.push(reward.index);
    let reward_owner_account = derive_ata(&accounts.authority, &reward.mint, &TOKEN_PROGRAM_ID);

    Instruction {
        program_id: WHIRLPOOL_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new_readonly(accounts.whirlpool, false),
            AccountMeta::new_readonly(accounts.authority, true),
            AccountMeta::new(accounts.position, false),
            AccountMeta::new_readonly(accounts.position_token_account, false),
            AccountMeta::new(reward_owner_account, false),
            AccountMeta::new(reward.vault, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        ],
        data,
    }
}

/// `close_position`: burns the NFT and returns rent to `receiver`.
#[must_use]
pub fn close_position(accounts: &PositionAccounts, receiver: &Pubkey) -> Instruction {
    Instruction {
        program_id: WHIRLPOOL_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new_readonly(accounts.authority, true),
            AccountMeta::new(*receiver, false),
            AccountMeta::new(accounts.position, false),
            AccountMeta::new(accounts.position_mint, false),
            AccountMeta::new(accounts.position_token_account, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: CLOSE_POSITION.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ModelExtras, TokenMeta};
    use clmm_builder_domain::enums::Protocol;

    fn pool() -> PoolState {
        let token = || TokenMeta {
            mint: Pubkey::new_unique(),
            decimals: 6,
            token_program: TOKEN_PROGRAM_ID,
            vault: Pubkey::new_unique(),
        };
        PoolState {
            address: Pubkey::new_unique(),
            protocol: Protocol::OrcaWhirlpools,
            spacing_unit: 64,
            current_index: 0,
            token_a: token(),
            token_b: token(),
            extras: ModelExtras::Tick {
                fee_rate: 3000,
                sqrt_price_x64: 1u128 << 64,
                liquidity: 0,
            },
            rewards: vec![],
        }
    }

    #[test]
    fn test_tick_array_start_index() {
        assert_eq!(tick_array_start_index(0, 64), 0);
        assert_eq!(tick_array_start_index(5631, 64), 0);
        assert_eq!(tick_array_start_index(5632, 64), 5632);
        assert_eq!(tick_array_start_index(-1, 64), -5632);
        assert_eq!(tick_array_start_index(-5632, 64), -5632);
    }

    #[test]
    fn test_open_position_layout() {
        let pool = pool();
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let accounts = PositionAccounts::resolve(&pool, mint, owner, -320, 320);
        let (_, bump) = derive_position(&mint);
        let ix = open_position(&accounts, &owner, bump, -320, 320);

        assert_eq!(ix.program_id, WHIRLPOOL_PROGRAM_ID);
        assert_eq!(&ix.data[..8], &OPEN_POSITION);
        assert_eq!(ix.data[8], bump);
        assert_eq!(&ix.data[9..13], &(-320i32).to_le_bytes());
        assert_eq!(&ix.data[13..17], &320i32.to_le_bytes());
        assert_eq!(ix.accounts.len(), 10);
        let signers: Vec<_> = ix.accounts.iter().filter(|m| m.is_signer).map(|m| m.pubkey).collect();
        assert_eq!(signers, vec![owner, mint]);
    }

    #[test]
    fn test_liquidity_instruction_data() {
        let pool = pool();
        let accounts = PositionAccounts::resolve(&pool, Pubkey::new_unique(), Pubkey::new_unique(), -64, 64);
        let ix = increase_liquidity(&accounts, 1_000, 10, 20);
        assert_eq!(ix.data.len(), 40);
        assert_eq!(&ix.data[8..24], &1_000u128.to_le_bytes());
        assert_eq!(&ix.data[24..32], &10u64.to_le_bytes());
        assert_eq!(&ix.data[32..40], &20u64.to_le_bytes());
        assert_eq!(ix.accounts.len(), 11);

        let ix = decrease_liquidity(&accounts, 7, 1, 2);
        assert_eq!(&ix.data[..8], &DECREASE_LIQUIDITY);
        assert_eq!(ix.accounts[9].pubkey, accounts.tick_array_lower);
    }

    #[test]
    fn test_collect_reward_index() {
        let pool = pool();
        let accounts = PositionAccounts::resolve(&pool, Pubkey::new_unique(), Pubkey::new_unique(), -64, 64);
        let reward = RewardSlot {
            index: 2,
            mint: Pubkey::new_unique(),
            vault: Pubkey::new_unique(),
        };
        let ix = collect_reward(&accounts, &reward);
        assert_eq!(ix.data, [&COLLECT_REWARD[..], &[2]].concat());
        assert_eq!(ix.accounts[5].pubkey, reward.vault);
    }
}
