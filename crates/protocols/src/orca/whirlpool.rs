//! Whirlpool and Position account layouts.

use crate::accounts::Reader;
use crate::error::ProtocolError;
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

/// Number of reward slots on a Whirlpool.
pub const NUM_REWARDS: usize = 3;

/// Whirlpool account discriminator.
pub const WHIRLPOOL_DISCRIMINATOR: [u8; 8] = [63, 149, 209, 12, 225, 128, 99, 9];

/// Position account discriminator.
pub const POSITION_DISCRIMINATOR: [u8; 8] = [170, 188, 143, 228, 122, 64, 247, 208];

/// Serialized Whirlpool size.
pub const WHIRLPOOL_LEN: usize = 653;

/// Serialized Position size.
pub const POSITION_LEN: usize = 216;

/// Reward emission state stored on the pool.
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct WhirlpoolRewardInfo {
    pub mint: Pubkey,
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub emissions_per_second_x64: u128,
    pub growth_global_x64: u128,
}

/// Whirlpool account.
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct Whirlpool {
    pub discriminator: [u8; 8],
    pub whirlpools_config: Pubkey,
    pub whirlpool_bump: [u8; 1],
    pub tick_spacing: u16,
    pub tick_spacing_seed: [u8; 2],
    pub fee_rate: u16,
    pub protocol_fee_rate: u16,
    pub liquidity: u128,
    pub sqrt_price: u128,
    pub tick_current_index: i32,
    pub protocol_fee_owed_a: u64,
    pub protocol_fee_owed_b: u64,
    pub token_mint_a: Pubkey,
    pub token_vault_a: Pubkey,
    pub fee_growth_global_a: u128,
    pub token_mint_b: Pubkey,
    pub token_vault_b: Pubkey,
    pub fee_growth_global_b: u128,
    pub reward_last_updated_timestamp: u64,
    pub reward_infos: [WhirlpoolRewardInfo; NUM_REWARDS],
}

impl Whirlpool {
    /// Decodes a Whirlpool account.
    ///
    /// # Errors
    /// Returns `Parse` on a short buffer or wrong discriminator.
    pub fn decode(address: &Pubkey, data: &[u8]) -> Result<Self, ProtocolError> {
        Reader::new("Whirlpool", *address, data, WHIRLPOOL_LEN)?
            .discriminator(WHIRLPOOL_DISCRIMINATOR)?;
        Self::deserialize(&mut &data[..])
            .map_err(|e| ProtocolError::parse("Whirlpool", *address, e.to_string()))
    }
}

/// Per-position reward checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionRewardInfo {
    pub growth_inside_checkpoint: u128,
    pub amount_owed: u64,
}

/// Whirlpool Position account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhirlpoolPosition {
    pub whirlpool: Pubkey,
    pub position_mint: Pubkey,
    pub liquidity: u128,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub fee_owed_a: u64,
    pub fee_owed_b: u64,
    pub reward_infos: [PositionRewardInfo; NUM_REWARDS],
}

impl WhirlpoolPosition {
    /// Decodes a Position account by field offsets.
    ///
    /// # Errors
    /// Returns `Parse` on a short buffer or wrong discriminator.
    pub fn decode(address: &Pubkey, data: &[u8]) -> Result<Self, ProtocolError> {
        let reader = Reader::new("Position", *address, data, POSITION_LEN)?;
        reader.discriminator(POSITION_DISCRIMINATOR)?;

        let mut reward_infos = [PositionRewardInfo::default(); NUM_REWARDS];
        for (i, info) in reward_infos.iter_mut().enumerate() {
            let base = 144 + i * 24;
            *info = PositionRewardInfo {
                growth_inside_checkpoint: reader.u128(base)?,
                amount_owed: reader.u64(base + 16)?,
            };
        }

        Ok(Self {
            whirlpool: reader.pubkey(8)?,
            position_mint: reader.pubkey(40)?,
            liquidity: reader.u128(72)?,
            tick_lower_index: reader.i32(88)?,
            tick_upper_index: reader.i32(92)?,
            fee_owed_a: reader.u64(112)?,
            fee_owed_b: reader.u64(136)?,
            reward_infos,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_whirlpool(reward_mint: Pubkey) -> Whirlpool {
        let reward = |mint: Pubkey| WhirlpoolRewardInfo {
            mint,
            vault: if mint == Pubkey::default() {
                Pubkey::default()
            } else {
                Pubkey::new_unique()
            },
            authority: Pubkey::new_unique(),
            emissions_per_second_x64: 0,
            growth_global_x64: 0,
        };
        Whirlpool {
            discriminator: WHIRLPOOL_DISCRIMINATOR,
            whirlpools_config: Pubkey::new_unique(),
            whirlpool_bump: [254],
            tick_spacing: 64,
            tick_spacing_seed: 64u16.to_le_bytes(),
            fee_rate: 3000,
            protocol_fee_rate: 300,
            liquidity: 1_000_000,
            sqrt_price: 1u128 << 64,
            tick_current_index: 0,
            protocol_fee_owed_a: 0,
            protocol_fee_owed_b: 0,
            token_mint_a: Pubkey::new_unique(),
            token_vault_a: Pubkey::new_unique(),
            fee_growth_global_a: 0,
            token_mint_b: Pubkey::new_unique(),
            token_vault_b: Pubkey::new_unique(),
            fee_growth_global_b: 0,
            reward_last_updated_timestamp: 0,
            reward_infos: [
                reward(reward_mint),
                reward(Pubkey::default()),
                reward(Pubkey::default()),
            ],
        }
    }

    pub(crate) fn encode_position(
        whirlpool: Pubkey,
        mint: Pubkey,
        liquidity: u128,
        lower: i32,
        upper: i32,
        fees: (u64, u64),
        reward0: u64,
    ) -> Vec<u8> {
        let mut data = vec![0u8; POSITION_LEN];
        data[..8].copy_from_slice(&POSITION_DISCRIMINATOR);
        data[8..40].copy_from_slice(whirlpool.as_ref());
        data[40..72].copy_from_slice(mint.as_ref());
        data[72..88].copy_from_slice(&liquidity.to_le_bytes());
        data[88..92].copy_from_slice(&lower.to_le_bytes());
        data[92..96].copy_from_slice(&upper.to_le_bytes());
        data[112..120].copy_from_slice(&fees.0.to_le_bytes());
        data[136..144].copy_from_slice(&fees.1.to_le_bytes());
        data[160..168].copy_from_slice(&reward0.to_le_bytes());
        data
    }

    #[test]
    fn test_whirlpool_layout_size() {
        let data = borsh::to_vec(&sample_whirlpool(Pubkey::new_unique())).unwrap();
        assert_eq!(data.len(), WHIRLPOOL_LEN);
        // tick_current_index sits after sqrt_price
        assert_eq!(&data[81..85], &0i32.to_le_bytes());
        assert_eq!(&data[65..81], &(1u128 << 64).to_le_bytes());
    }

    #[test]
    fn test_whirlpool_decode() {
        let pool = sample_whirlpool(Pubkey::new_unique());
        let data = borsh::to_vec(&pool).unwrap();
        let decoded = Whirlpool::decode(&Pubkey::new_unique(), &data).unwrap();
        assert_eq!(decoded, pool);

        let mut wrong = data.clone();
        wrong[0] ^= 0xff;
        assert!(Whirlpool::decode(&Pubkey::new_unique(), &wrong).is_err());
        assert!(Whirlpool::decode(&Pubkey::new_unique(), &data[..600]).is_err());
    }

    #[test]
    fn test_position_decode() {
        let pool = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let data = encode_position(pool, mint, 42, -128, 256, (7, 9), 11);
        let position = WhirlpoolPosition::decode(&Pubkey::new_unique(), &data).unwrap();
        assert_eq!(position.whirlpool, pool);
        assert_eq!(position.position_mint, mint);
        assert_eq!(position.liquidity, 42);
        assert_eq!(position.tick_lower_index, -128);
        assert_eq!(position.tick_upper_index, 256);
        assert_eq!((position.fee_owed_a, position.fee_owed_b), (7, 9));
        assert_eq!(position.reward_infos[0].amount_owed, 11);
        assert_eq!(position.reward_infos[1].amount_owed, 0);
    }
}
