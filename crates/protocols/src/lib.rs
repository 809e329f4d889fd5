//! On-chain adapters for Orca Whirlpools and Meteora DLMM.
//!
//! This crate provides:
//! - RPC access with bounded timeouts behind `AccountSource` / `BlockhashSource`
//! - Account decoders for pools, positions and mints
//! - Instruction encoders and PDA derivation per protocol
//! - A `ChainReader` turning raw accounts into pool and position snapshots

/// Program ids, shared PDAs and field readers.
pub mod accounts;
/// Error types.
pub mod error;
/// Meteora DLMM.
pub mod meteora;
/// Orca Whirlpools.
pub mod orca;
/// Account decoding entry point.
pub mod reader;
/// RPC provider and source traits.
pub mod rpc;
/// Pool and position snapshots.
pub mod state;

pub use error::ProtocolError;
pub use reader::ChainReader;
pub use rpc::{AccountSource, BlockhashSource, RawAccount, RpcProvider};
pub use state::{ModelExtras, PoolState, PositionSnapshot, RewardSlot, TokenMeta};

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

/// Fetches and decodes pool accounts.
#[async_trait]
pub trait PoolFetcher: Send + Sync {
    /// Fetches the current state of `pool`.
    async fn fetch_pool(&self, pool: &Pubkey) -> Result<PoolState, ProtocolError>;
}

/// Fetches and decodes position accounts.
#[async_trait]
pub trait PositionFetcher: Send + Sync {
    /// Fetches the current state of `position`.
    async fn fetch_position(&self, position: &Pubkey) -> Result<PositionSnapshot, ProtocolError>;
}
