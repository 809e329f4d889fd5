//! LbPair and PositionV2 account layouts, decoded by offset.
//!
//! Layout (Anchor 8-byte discriminator prefix):
//! - `base_factor`:  8..10   (u16, first field of `StaticParameters`)
//! - `active_id`:    76..80  (i32)
//! - `bin_step`:     80..82  (u16)
//! - `token_x_mint`: 88..120
//! - `token_y_mint`: 120..152
//! - `reserve_x`:    152..184
//! - `reserve_y`:    184..216
//! - `reward_infos`: 264..552 (2 x 144 bytes; mint at +0, vault at +32)
//! - `oracle`:       552..584

use crate::accounts::Reader;
use crate::error::ProtocolError;
use solana_sdk::pubkey::Pubkey;

/// Reward slots on an LbPair.
pub const NUM_REWARDS: usize = 2;

/// Bins tracked by a position account.
pub const POSITION_MAX_BINS: usize = 70;

/// LbPair account discriminator.
pub const LB_PAIR_DISCRIMINATOR: [u8; 8] = [33, 11, 49, 98, 181, 101, 177, 13];

/// PositionV2 account discriminator.
pub const POSITION_V2_DISCRIMINATOR: [u8; 8] = [117, 176, 212, 199, 245, 180, 133, 182];

const LB_PAIR_MIN_LEN: usize = 584;
const REWARD_INFOS_OFFSET: usize = 264;
const REWARD_INFO_LEN: usize = 144;

const POSITION_MIN_LEN: usize = 7920;
const LIQUIDITY_SHARES_OFFSET: usize = 72;
const USER_REWARDS_OFFSET: usize = 1192;
const FEE_INFOS_OFFSET: usize = 4552;
const PER_BIN_INFO_LEN: usize = 48;

/// Reward slot fields needed to claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LbRewardInfo {
    pub mint: Pubkey,
    pub vault: Pubkey,
}

/// Decoded LbPair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LbPair {
    pub base_factor: u16,
    pub active_id: i32,
    pub bin_step: u16,
    pub token_x_mint: Pubkey,
    pub token_y_mint: Pubkey,
    pub reserve_x: Pubkey,
    pub reserve_y: Pubkey,
    pub reward_infos: [LbRewardInfo; NUM_REWARDS],
    pub oracle: Pubkey,
}

impl LbPair {
    /// Decodes an LbPair account.
    ///
    /// # Errors
    /// Returns `Parse` on a short buffer or wrong discriminator.
    pub fn decode(address: &Pubkey, data: &[u8]) -> Result<Self, ProtocolError> {
        let reader = Reader::new("LbPair", *address, data, LB_PAIR_MIN_LEN)?;
        reader.discriminator(LB_PAIR_DISCRIMINATOR)?;

        let reward = |i: usize| -> Result<LbRewardInfo, ProtocolError> {
            let base = REWARD_INFOS_OFFSET + i * REWARD_INFO_LEN;
            Ok(LbRewardInfo {
                mint: reader.pubkey(base)?,
                vault: reader.pubkey(base + 32)?,
            })
        };

        Ok(Self {
            base_factor: reader.u16(8)?,
            active_id: reader.i32(76)?,
            bin_step: reader.u16(80)?,
            token_x_mint: reader.pubkey(88)?,
            token_y_mint: reader.pubkey(120)?,
            reserve_x: reader.pubkey(152)?,
            reserve_y: reader.pubkey(184)?,
            reward_infos: [reward(0)?, reward(1)?],
            oracle: reader.pubkey(552)?,
        })
    }
}

/// Decoded PositionV2, summed over its bins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DlmmPosition {
    pub lb_pair: Pubkey,
    pub owner: Pubkey,
    pub lower_bin_id: i32,
    pub upper_bin_id: i32,
    /// Sum of the per-bin liquidity shares.
    pub total_liquidity: u128,
    pub fee_x_pending: u64,
    pub fee_y_pending: u64,
    pub reward_pendings: [u64; NUM_REWARDS],
}

impl DlmmPosition {
    /// Decodes a PositionV2 account.
    ///
    /// # Errors
    /// Returns `Parse` on a short buffer or wrong discriminator.
    pub fn decode(address: &Pubkey, data: &[u8]) -> Result<Self, ProtocolError> {
        let reader = Reader::new("PositionV2", *address, data, POSITION_MIN_LEN)?;
        reader.discriminator(POSITION_V2_DISCRIMINATOR)?;

        let lower_bin_id = reader.i32(7912)?;
        let upper_bin_id = reader.i32(7916)?;
        let width = usize::try_from(i64::from(upper_bin_id) - i64::from(lower_bin_id) + 1)
            .unwrap_or(0)
            .min(POSITION_MAX_BINS);

        let mut total_liquidity = 0u128;
        let mut fee_x_pending = 0u64;
        let mut fee_y_pending = 0u64;
        let mut reward_pendings = [0u64; NUM_REWARDS];

        for bin in 0..width {
            total_liquidity =
                total_liquidity.saturating_add(reader.u128(LIQUIDITY_SHARES_OFFSET + bin * 16)?);

            let rewards = USER_REWARDS_OFFSET + bin * PER_BIN_INFO_LEN + 32;
            for (slot, pending) in reward_pendings.iter_mut().enumerate() {
                *pending = pending.saturating_add(reader.u64(rewards + slot * 8)?);
            }

            let fees = FEE_INFOS_OFFSET + bin * PER_BIN_INFO_LEN + 32;
            fee_x_pending = fee_x_pending.saturating_add(reader.u64(fees)?);
            fee_y_pending = fee_y_pending.saturating_add(reader.u64(fees + 8)?);
        }

        Ok(Self {
            lb_pair: reader.pubkey(8)?,
            owner: reader.pubkey(40)?,
            lower_bin_id,
            upper_bin_id,
            total_liquidity,
            fee_x_pending,
            fee_y_pending,
            reward_pendings,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) struct LbPairFixture {
        pub active_id: i32,
        pub bin_step: u16,
        pub token_x_mint: Pubkey,
        pub token_y_mint: Pubkey,
        pub reward_mint: Pubkey,
    }

    pub(crate) fn encode_lb_pair(fixture: &LbPairFixture) -> Vec<u8> {
        let mut data = vec![0u8; 904];
        data[..8].copy_from_slice(&LB_PAIR_DISCRIMINATOR);
        data[8..10].copy_from_slice(&10_000u16.to_le_bytes());
        data[76..80].copy_from_slice(&fixture.active_id.to_le_bytes());
        data[80..82].copy_from_slice(&fixture.bin_step.to_le_bytes());
        data[88..120].copy_from_slice(fixture.token_x_mint.as_ref());
        data[120..152].copy_from_slice(fixture.token_y_mint.as_ref());
        data[152..184].copy_from_slice(Pubkey::new_unique().as_ref());
        data[184..216].copy_from_slice(Pubkey::new_unique().as_ref());
        data[264..296].copy_from_slice(fixture.reward_mint.as_ref());
        data[296..328].copy_from_slice(Pubkey::new_unique().as_ref());
        data[552..584].copy_from_slice(Pubkey::new_unique().as_ref());
        data
    }

    pub(crate) fn encode_position(lb_pair: Pubkey, owner: Pubkey, lower: i32, upper: i32, shares: &[u128]) -> Vec<u8> {
        let mut data = vec![0u8; 8120];
        data[..8].copy_from_slice(&POSITION_V2_DISCRIMINATOR);
        data[8..40].copy_from_slice(lb_pair.as_ref());
        data[40..72].copy_from_slice(owner.as_ref());
        for (i, share) in shares.iter().enumerate() {
            let at = LIQUIDITY_SHARES_OFFSET + i * 16;
            data[at..at + 16].copy_from_slice(&share.to_le_bytes());
        }
        data[7912..7916].copy_from_slice(&lower.to_le_bytes());
        data[7916..7920].copy_from_slice(&upper.to_le_bytes());
        data
    }

    #[test]
    fn test_lb_pair_decode() {
        let fixture = LbPairFixture {
            active_id: 8_388_608,
            bin_step: 25,
            token_x_mint: Pubkey::new_unique(),
            token_y_mint: Pubkey::new_unique(),
            reward_mint: Pubkey::new_unique(),
        };
        let pair = LbPair::decode(&Pubkey::new_unique(), &encode_lb_pair(&fixture)).unwrap();
        assert_eq!(pair.active_id, 8_388_608);
        assert_eq!(pair.bin_step, 25);
        assert_eq!(pair.base_factor, 10_000);
        assert_eq!(pair.token_x_mint, fixture.token_x_mint);
        assert_eq!(pair.reward_infos[0].mint, fixture.reward_mint);
        assert_eq!(pair.reward_infos[1].mint, Pubkey::default());
    }

    #[test]
    fn test_position_sums_bins() {
        let pair = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut data = encode_position(pair, owner, 100, 102, &[5, 6, 7]);
        // fee_x_pending of the second bin
        let at = FEE_INFOS_OFFSET + PER_BIN_INFO_LEN + 32;
        data[at..at + 8].copy_from_slice(&9u64.to_le_bytes());
        // reward slot 1 pending of the third bin
        let at = USER_REWARDS_OFFSET + 2 * PER_BIN_INFO_LEN + 40;
        data[at..at + 8].copy_from_slice(&4u64.to_le_bytes());

        let position = DlmmPosition::decode(&Pubkey::new_unique(), &data).unwrap();
        assert_eq!(position.lb_pair, pair);
        assert_eq!(position.owner, owner);
        assert_eq!(position.total_liquidity, 18);
        assert_eq!(position.fee_x_pending, 9);
        assert_eq!(position.fee_y_pending, 0);
        assert_eq!(position.reward_pendings, [0, 4]);
    }

    #[test]
    fn test_short_position_rejected() {
        let data = vec![0u8; 100];
        assert!(matches!(
            DlmmPosition::decode(&Pubkey::new_unique(), &data),
            Err(ProtocolError::Parse { .. })
        ));
    }
}
