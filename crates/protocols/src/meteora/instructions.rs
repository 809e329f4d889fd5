//! DLMM instruction encoders and PDAs.

use crate::accounts::{
    DLMM_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID, derive_ata, derive_event_authority,
    with_discriminator,
};
use crate::state::{PoolState, RewardSlot};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

/// Bins stored per bin array.
pub const BIN_ARRAY_SIZE: i32 = 70;

/// `StrategyType::SpotImBalanced`: spot shape with caller-chosen X and Y totals.
pub const STRATEGY_SPOT_IMBALANCED: u8 = 6;

const INITIALIZE_POSITION: [u8; 8] = [219, 192, 234, 71, 190, 191, 102, 80];
const ADD_LIQUIDITY_BY_STRATEGY: [u8; 8] = [7, 3, 150, 127, 148, 40, 61, 200];
const REMOVE_LIQUIDITY_BY_RANGE: [u8; 8] = [26, 82, 102, 152, 240, 74, 105, 26];
const CLAIM_FEE: [u8; 8] = [169, 32, 79, 137, 136, 232, 70, 137];
const CLAIM_REWARD: [u8; 8] = [149, 95, 181, 242, 94, 90, 158, 162];
const CLOSE_POSITION: [u8; 8] = [123, 134, 81, 0, 49, 68, 98, 98];

/// Index of the bin array containing `bin_id`.
#[must_use]
pub fn bin_array_index(bin_id: i32) -> i64 {
    i64::from(bin_id.div_euclid(BIN_ARRAY_SIZE))
}

/// Derives the bin array PDA containing `bin_id`.
#[must_use]
pub fn derive_bin_array(lb_pair: &Pubkey, bin_id: i32) -> Pubkey {
    Pubkey::find_program_address(
        &[
            b"bin_array",
            lb_pair.as_ref(),
            &bin_array_index(bin_id).to_le_bytes(),
        ],
        &DLMM_PROGRAM_ID,
    )
    .0
}

/// Addresses shared by every instruction acting on one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionAccounts {
    pub lb_pair: Pubkey,
    pub position: Pubkey,
    pub sender: Pubkey,
    pub user_token_x: Pubkey,
    pub user_token_y: Pubkey,
    pub reserve_x: Pubkey,
    pub reserve_y: Pubkey,
    pub token_x_mint: Pubkey,
    pub token_y_mint: Pubkey,
    pub token_x_program: Pubkey,
    pub token_y_program: Pubkey,
    pub bin_array_lower: Pubkey,
    pub bin_array_upper: Pubkey,
    pub event_authority: Pubkey,
}

impl PositionAccounts {
    /// Resolves all addresses for `sender`'s position over `[lower_bin, upper_bin]`.
    #[must_use]
    pub fn resolve(pool: &PoolState, position: Pubkey, sender: Pubkey, lower_bin: i32, upper_bin: i32) -> Self {
        Self {
            lb_pair: pool.address,
            position,
            sender,
            user_token_x: derive_ata(&sender, &pool.token_a.mint, &pool.token_a.token_program),
            user_token_y: derive_ata(&sender, &pool.token_b.mint, &pool.token_b.token_program),
            reserve_x: pool.token_a.vault,
            reserve_y: pool.token_b.vault,
            token_x_mint: pool.token_a.mint,
            token_y_mint: pool.token_b.mint,
            token_x_program: pool.token_a.token_program,
            token_y_program: pool.token_b.token_program,
            bin_array_lower: derive_bin_array(&pool.address, lower_bin),
            bin_array_upper: derive_bin_array(&pool.address, upper_bin),
            event_authority: derive_event_authority(&DLMM_PROGRAM_ID),
        }
    }

    // Shared by add and remove. The optional bitmap extension is passed as
    // the program id.
    fn liquidity_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.position, false),
            AccountMeta::new(self.lb_pair, false),
            AccountMeta::new_readonly(DLMM_PROGRAM_ID, false),
            AccountMeta::new(self.user_token_x, false),
            AccountMeta::new(self.user_token_y, false),
            AccountMeta::new(self.reserve_x, false),
            AccountMeta::new(self.reserve_y, false),
            AccountMeta::new_readonly(self.token_x_mint, false),
            AccountMeta::new_readonly(self.token_y_mint, false),
            AccountMeta::new(self.bin_array_lower, false),
            AccountMeta::new(self.bin_array_upper, false),
            AccountMeta::new_readonly(self.sender, true),
            AccountMeta::new_readonly(self.token_x_program, false),
            AccountMeta::new_readonly(self.token_y_program, false),
            AccountMeta::new_readonly(self.event_authority, false),
            AccountMeta::new_readonly(DLMM_PROGRAM_ID, false),
        ]
    }

    fn reward_metas(&self, reward: &RewardSlot) -> [AccountMeta; 3] {
        [
            AccountMeta::new(reward.vault, false),
            AccountMeta::new_readonly(reward.mint, false),
            AccountMeta::new(derive_ata(&self.sender, &reward.mint, &TOKEN_PROGRAM_ID), false),
        ]
    }
}

/// `initialize_position`. The generated `position` keypair must co-sign.
#[must_use]
pub fn initialize_position(accounts: &PositionAccounts, payer: &Pubkey, lower_bin_id: i32, width: i32) -> Instruction {
    let mut data = with_discriminator(INITIALIZE_POSITION, 8);
    data.extend_from_slice(&lower_bin_id.to_le_bytes());
    data.extend_from_slice(&width.to_le_bytes());

    Instruction {
        program_id: DLMM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(accounts.position, true),
            AccountMeta::new_readonly(accounts.lb_pair, false),
            AccountMeta::new_readonly(accounts.sender, true),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(solana_sdk::sysvar::rent::ID, false),
            AccountMeta::new_readonly(accounts.event_authority, false),
            AccountMeta::new_readonly(DLMM_PROGRAM_ID, false),
        ],
        data,
    }
}

/// Arguments of `add_liquidity_by_strategy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddLiquidityArgs {
    pub amount_x: u64,
    pub amount_y: u64,
    pub active_id: i32,
    pub max_active_bin_slippage: i32,
    pub min_bin_id: i32,
    pub max_bin_id: i32,
}

/// `add_liquidity_by_strategy` with a spot shape.
#[must_use]
pub fn add_liquidity_by_strategy(accounts: &PositionAccounts, args: &AddLiquidityArgs) -> Instruction {
    let mut data = with_discriminator(ADD_LIQUIDITY_BY_STRATEGY, 97);
    data.extend_from_slice(&args.amount_x.to_le_bytes());
    data.extend_from_slice(&args.amount_y.to_le_bytes());
    data.extend_from_slice(&args.active_id.to_le_bytes());
    data.extend_from_slice(&args.max_active_bin_slippage.to_le_bytes());
    data.extend_from_slice(&args.min_bin_id.to_le_bytes());
    data.extend_from_slice(&args.max_bin_id.to_le_bytes());
    data.push(STRATEGY_SPOT_IMBALANCED);
    data.extend_from_slice(&[0u8; 64]);

    Instruction {
        program_id: DLMM_PROGRAM_ID,
        accounts: accounts.liquidity_metas(),
        data,
    }
}

/// `remove_liquidity_by_range`, removing `bps` of every bin in `[from, to]`.
#[must_use]
pub fn remove_liquidity_by_range(accounts: &PositionAccounts, from_bin_id: i32, to_bin_id: i32, bps: u16) -> Instruction {
    let mut data = with_discriminator(REMOVE_LIQUIDITY_BY_RANGE, 10);
    data.extend_from_slice(&from_bin_id.to_le_bytes());
    data.extend_from_slice(&to_bin_id.to_le_bytes());
    data.extend_from_slice(&bps.to_le_bytes());

    Instruction {
        program_id: DLMM_PROGRAM_ID,
        accounts: accounts.liquidity_metas(),
        data,
    }
}

/// `claim_fee`.
#[must_use]
pub fn claim_fee(accounts: &PositionAccounts) -> Instruction {
    Instruction {
        program_id: DLMM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(accounts.lb_pair, false),
            AccountMeta::new(accounts.position, false),
            AccountMeta::new(accounts.bin_array_lower, false),
            AccountMeta::new(accounts.bin_array_upper, false),
            AccountMeta::new_readonly(accounts.sender, true),
            AccountMeta::new(accounts.reserve_x, false),
            AccountMeta::new(accounts.reserve_y, false),
            AccountMeta::new(accounts.user_token_x, false),
            AccountMeta::new(accounts.user_token_y, false),
            AccountMeta::new_readonly(accounts.token_x_mint, false),
            AccountMeta::new_readonly(accounts.token_y_mint, false),
            AccountMeta::new_readonly(accounts.token_x_program, false),
            AccountMeta::new_readonly(accounts.event_authority, false),
            AccountMeta::new_readonly(DLMM_PROGRAM_ID, false),
        ],
        data: CLAIM_FEE.to_vec(),
    }
}

/// `claim_reward` for one reward slot.
#[must_use]
pub fn claim_reward(accounts: &PositionAccounts, reward: &RewardSlot) -> Instruction {
    let mut data = with_discriminator(CLAIM_REWARD, 8);
    data.extend_from_slice(&u64::from(reward.index).to_le_bytes());
    let [vault, mint, user_account] = accounts.reward_metas(reward);

    Instruction {
        program_id: DLMM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(accounts.lb_pair, false),
            AccountMeta::new(accounts.position, false),
            AccountMeta::new(accounts.bin_array_lower, false),
            AccountMeta::new(accounts.bin_array_upper, false),
            AccountMeta::new_readonly(accounts.sender, true),
            vault,
            mint,
            user_account,
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(accounts.event_authority, false),
            AccountMeta::new_readonly(DLMM_PROGRAM_ID, false),
        ],
        data,
    }
}

/// `close_position`: returns rent to `rent_receiver`.
#[must_use]
pub fn close_position(accounts: &PositionAccounts, rent_receiver: &Pubkey) -> Instruction {
    Instruction {
        program_id: DLMM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(accounts.position, false),
            AccountMeta::new(accounts.lb_pair, false),
            AccountMeta::new(accounts.bin_array_lower, false),
            AccountMeta::new(accounts.bin_array_upper, false),
            AccountMeta::new_readonly(accounts.sender, true),
            AccountMeta::new(*rent_receiver, false),
            AccountMeta::new_readonly(accounts.event_authority, false),
            AccountMeta::new_readonly(DLMM_PROGRAM_ID, false),
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
            decimals: 9,
            token_program: TOKEN_PROGRAM_ID,
            vault: Pubkey::new_unique(),
        };
        PoolState {
            address: Pubkey::new_unique(),
            protocol: Protocol::MeteoraDlmm,
            spacing_unit: 25,
            current_index: 8_388_608,
            token_a: token(),
            token_b: token(),
            extras: ModelExtras::Bin {
                base_factor: 10_000,
                oracle: Pubkey::new_unique(),
            },
            rewards: vec![],
        }
    }

    #[test]
    fn test_bin_array_index_floors() {
        assert_eq!(bin_array_index(0), 0);
        assert_eq!(bin_array_index(69), 0);
        assert_eq!(bin_array_index(70), 1);
        assert_eq!(bin_array_index(-1), -1);
        assert_eq!(bin_array_index(-70), -1);
        assert_eq!(bin_array_index(-71), -2);
    }

    #[test]
    fn test_initialize_position_layout() {
        let pool = pool();
        let owner = Pubkey::new_unique();
        let position = Pubkey::new_unique();
        let accounts = PositionAccounts::resolve(&pool, position, owner, 100, 168);
        let ix = initialize_position(&accounts, &owner, 100, 69);
        assert_eq!(&ix.data[..8], &INITIALIZE_POSITION);
        assert_eq!(&ix.data[8..12], &100i32.to_le_bytes());
        assert_eq!(&ix.data[12..16], &69i32.to_le_bytes());
        assert!(ix.accounts[1].is_signer && ix.accounts[1].pubkey == position);
    }

    #[test]
    fn test_add_liquidity_data_length() {
        let pool = pool();
        let accounts = PositionAccounts::resolve(&pool, Pubkey::new_unique(), Pubkey::new_unique(), 0, 10);
        let ix = add_liquidity_by_strategy(
            &accounts,
            &AddLiquidityArgs {
                amount_x: 1,
                amount_y: 2,
                active_id: 5,
                max_active_bin_slippage: 3,
                min_bin_id: 0,
                max_bin_id: 10,
            },
        );
        assert_eq!(ix.data.len(), 8 + 8 + 8 + 4 + 4 + 4 + 4 + 1 + 64);
        assert_eq!(ix.data[40], STRATEGY_SPOT_IMBALANCED);
        assert_eq!(ix.accounts.len(), 16);
    }

    #[test]
    fn test_full_removal_and_close_layout() {
        let pool = pool();
        let owner = Pubkey::new_unique();
        let accounts = PositionAccounts::resolve(&pool, Pubkey::new_unique(), owner, 0, 10);

        let remove = remove_liquidity_by_range(&accounts, 0, 10, 10_000);
        assert_eq!(&remove.data[..8], &REMOVE_LIQUIDITY_BY_RANGE);
        assert_eq!(&remove.data[16..18], &10_000u16.to_le_bytes());
        assert_eq!(remove.accounts.len(), 16);

        let close = close_position(&accounts, &owner);
        assert_eq!(close.data, CLOSE_POSITION.to_vec());
        assert_eq!(close.accounts[5].pubkey, owner);
        assert!(close.accounts[5].is_writable);
    }

    #[test]
    fn test_claim_reward_index_is_u64() {
        let pool = pool();
        let accounts = PositionAccounts::resolve(&pool, Pubkey::new_unique(), Pubkey::new_unique(), 0, 10);
        let reward = RewardSlot {
            index: 1,
            mint: Pubkey::new_unique(),
            vault: Pubkey::new_unique(),
        };
        let ix = claim_reward(&accounts, &reward);
        assert_eq!(&ix.data[8..], &1u64.to_le_bytes());
    }
}
