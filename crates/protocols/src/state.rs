//! Chain-level snapshots of pools and positions.

use clmm_builder_domain::enums::{AmmModel, Protocol};
use clmm_builder_domain::quote::PoolPricing;
use clmm_builder_domain::value_objects::Range;
use solana_sdk::pubkey::Pubkey;

/// Mint fields needed to describe a pool token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintInfo {
    /// Mint decimals.
    pub decimals: u8,
    /// Program owning the mint.
    pub token_program: Pubkey,
}

/// One side of a pool's token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMeta {
    /// Token mint.
    pub mint: Pubkey,
    /// Mint decimals.
    pub decimals: u8,
    /// Program owning the mint (SPL Token or Token-2022).
    pub token_program: Pubkey,
    /// Pool vault (Whirlpool) or reserve (DLMM) holding this token.
    pub vault: Pubkey,
}

impl TokenMeta {
    /// Combines a mint address, its vault and its mint account fields.
    #[must_use]
    pub fn new(mint: Pubkey, vault: Pubkey, info: MintInfo) -> Self {
        Self {
            mint,
            decimals: info.decimals,
            token_program: info.token_program,
            vault,
        }
    }
}

/// A pool reward slot. A default mint means no reward is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardSlot {
    /// Slot index as used by the claim instruction.
    pub index: u8,
    /// Reward mint.
    pub mint: Pubkey,
    /// Reward vault.
    pub vault: Pubkey,
}

impl RewardSlot {
    /// Returns true when a reward is configured for this slot.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.mint != Pubkey::default()
    }
}

/// Protocol-specific pool fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelExtras {
    /// DLMM fields.
    Bin {
        /// Base fee factor.
        base_factor: u16,
        /// Oracle account.
        oracle: Pubkey,
    },
    /// Whirlpool fields.
    Tick {
        /// Fee rate in hundredths of a basis point.
        fee_rate: u16,
        /// Current Q64.64 sqrt price.
        sqrt_price_x64: u128,
        /// Active liquidity.
        liquidity: u128,
    },
}

/// Immutable snapshot of a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolState {
    /// Pool address.
    pub address: Pubkey,
    /// Owning protocol.
    pub protocol: Protocol,
    /// Bin step (bps) or tick spacing.
    pub spacing_unit: u16,
    /// Active bin id or current tick.
    pub current_index: i32,
    /// Token A (Whirlpool) / X (DLMM).
    pub token_a: TokenMeta,
    /// Token B (Whirlpool) / Y (DLMM).
    pub token_b: TokenMeta,
    /// Protocol-specific fields.
    pub extras: ModelExtras,
    /// Reward slots in protocol order, including unconfigured ones.
    pub rewards: Vec<RewardSlot>,
}

impl PoolState {
    /// Pool model.
    #[must_use]
    pub fn model(&self) -> AmmModel {
        self.protocol.model()
    }

    /// Program owning the pool.
    #[must_use]
    pub fn program_id(&self) -> Pubkey {
        match self.protocol {
            Protocol::OrcaWhirlpools => crate::accounts::WHIRLPOOL_PROGRAM_ID,
            Protocol::MeteoraDlmm => crate::accounts::DLMM_PROGRAM_ID,
        }
    }

    /// Reward slots with a configured mint.
    pub fn active_rewards(&self) -> impl Iterator<Item = &RewardSlot> {
        self.rewards.iter().filter(|slot| slot.is_active())
    }

    /// The pricing view consumed by the quote engine.
    #[must_use]
    pub fn pricing(&self) -> PoolPricing {
        let sqrt_price_x64 = match self.extras {
            ModelExtras::Tick { sqrt_price_x64, .. } => Some(sqrt_price_x64),
            ModelExtras::Bin { .. } => None,
        };
        PoolPricing {
            model: self.model(),
            spacing_unit: self.spacing_unit,
            current_index: self.current_index,
            sqrt_price_x64,
        }
    }
}

/// A freshly read position account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSnapshot {
    /// Position account address.
    pub address: Pubkey,
    /// Pool the position belongs to.
    pub pool: Pubkey,
    /// Owning protocol.
    pub protocol: Protocol,
    /// Owner recorded in the account (DLMM only; Whirlpool ownership follows the NFT).
    pub owner: Option<Pubkey>,
    /// Position NFT mint (Whirlpool only).
    pub position_mint: Option<Pubkey>,
    /// Position bounds.
    pub range: Range,
    /// Liquidity units held.
    pub liquidity: u128,
    /// Token A fees owed as of the last on-chain checkpoint.
    pub fees_owed_a: u64,
    /// Token B fees owed as of the last on-chain checkpoint.
    pub fees_owed_b: u64,
    /// Reward amounts owed, indexed like the pool's reward slots.
    pub rewards_owed: Vec<u64>,
}

impl PositionSnapshot {
    /// Returns true when the position holds liquidity.
    #[must_use]
    pub fn is_funded(&self) -> bool {
        self.liquidity > 0
    }

    /// Returns true when fees or rewards are recorded as owed.
    #[must_use]
    pub fn has_claimable(&self) -> bool {
        self.fees_owed_a > 0 || self.fees_owed_b > 0 || self.rewards_owed.iter().any(|r| *r > 0)
    }
}
