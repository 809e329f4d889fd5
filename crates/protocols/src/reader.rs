//! Reads pools and positions through an [`AccountSource`], dispatching on the
//! owning program.

use crate::accounts::{DLMM_PROGRAM_ID, WHIRLPOOL_PROGRAM_ID, mint_decimals};
use crate::error::ProtocolError;
use crate::meteora::{self, lb_pair::DlmmPosition, lb_pair::LbPair};
use crate::orca::{self, whirlpool::Whirlpool, whirlpool::WhirlpoolPosition};
use crate::rpc::{AccountSource, RawAccount};
use crate::state::{MintInfo, PoolState, PositionSnapshot};
use crate::{PoolFetcher, PositionFetcher};
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::debug;

/// Decodes pool and position accounts fetched from an [`AccountSource`].
pub struct ChainReader<S: ?Sized> {
    source: Arc<S>,
}

impl<S: ?Sized> Clone for ChainReader<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: AccountSource + ?Sized> ChainReader<S> {
    /// Creates a reader over `source`.
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    async fn account(&self, address: &Pubkey) -> Result<RawAccount, ProtocolError> {
        self.source
            .get_account(address)
            .await?
            .ok_or(ProtocolError::AccountNotFound(*address))
    }

    async fn mint_infos(&self, mints: [Pubkey; 2]) -> Result<[MintInfo; 2], ProtocolError> {
        let accounts = self.source.get_accounts(&mints).await?;
        let mut infos = [MintInfo {
            decimals: 0,
            token_program: Pubkey::default(),
        }; 2];
        for ((info, mint), account) in infos.iter_mut().zip(mints).zip(accounts) {
            let account = account.ok_or(ProtocolError::AccountNotFound(mint))?;
            *info = MintInfo {
                decimals: mint_decimals(&mint, &account.data)?,
                token_program: account.owner,
            };
        }
        Ok(infos)
    }
}

#[async_trait]
impl<S: AccountSource + ?Sized> PoolFetcher for ChainReader<S> {
    async fn fetch_pool(&self, address: &Pubkey) -> Result<PoolState, ProtocolError> {
        let account = self.account(address).await?;
        debug!(pool = %address, owner = %account.owner, bytes = account.data.len(), "Decoding pool account");

        if account.owner == WHIRLPOOL_PROGRAM_ID {
            let pool = Whirlpool::decode(address, &account.data)?;
            let [mint_a, mint_b] = self.mint_infos([pool.token_mint_a, pool.token_mint_b]).await?;
            Ok(orca::pool_state(*address, &pool, mint_a, mint_b))
        } else if account.owner == DLMM_PROGRAM_ID {
            let pair = LbPair::decode(address, &account.data)?;
            let [mint_x, mint_y] = self.mint_infos([pair.token_x_mint, pair.token_y_mint]).await?;
            Ok(meteora::pool_state(*address, &pair, mint_x, mint_y))
        } else {
            Err(ProtocolError::UnsupportedOwner {
                address: *address,
                owner: account.owner,
            })
        }
    }
}

#[async_trait]
impl<S: AccountSource + ?Sized> PositionFetcher for ChainReader<S> {
    async fn fetch_position(&self, address: &Pubkey) -> Result<PositionSnapshot, ProtocolError> {
        let account = self.account(address).await?;
        debug!(position = %address, owner = %account.owner, "Decoding position account");

        if account.owner == WHIRLPOOL_PROGRAM_ID {
            let position = WhirlpoolPosition::decode(address, &account.data)?;
            Ok(orca::position_snapshot(*address, &position))
        } else if account.owner == DLMM_PROGRAM_ID {
            let position = DlmmPosition::decode(address, &account.data)?;
            Ok(meteora::position_snapshot(*address, &position))
        } else {
            Err(ProtocolError::UnsupportedOwner {
                address: *address,
                owner: account.owner,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{MINT_ACCOUNT_LEN, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};
    use crate::meteora::lb_pair::tests::{LbPairFixture, encode_lb_pair};
    use crate::orca::whirlpool::tests::{encode_position, sample_whirlpool};
    use clmm_builder_domain::enums::Protocol;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    #[derive(Default)]
    struct MemoryAccounts {
        accounts: RwLock<HashMap<Pubkey, RawAccount>>,
    }

    impl MemoryAccounts {
        async fn insert(&self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
            self.accounts
                .write()
                .await
                .insert(address, RawAccount { owner, data });
        }

        async fn insert_mint(&self, mint: Pubkey, program: Pubkey, decimals: u8) {
            let mut data = vec![0u8; MINT_ACCOUNT_LEN];
            data[44] = decimals;
            self.insert(mint, program, data).await;
        }
    }

    #[async_trait]
    impl AccountSource for MemoryAccounts {
        async fn get_account(&self, address: &Pubkey) -> Result<Option<RawAccount>, ProtocolError> {
            Ok(self.accounts.read().await.get(address).cloned())
        }

        async fn get_accounts(
            &self,
            addresses: &[Pubkey],
        ) -> Result<Vec<Option<RawAccount>>, ProtocolError> {
            let accounts = self.accounts.read().await;
            Ok(addresses.iter().map(|a| accounts.get(a).cloned()).collect())
        }
    }

    #[tokio::test]
    async fn test_fetch_whirlpool() {
        let source = Arc::new(MemoryAccounts::default());
        let reward_mint = Pubkey::new_unique();
        let pool = sample_whirlpool(reward_mint);
        let address = Pubkey::new_unique();
        source
            .insert(address, WHIRLPOOL_PROGRAM_ID, borsh::to_vec(&pool).unwrap())
            .await;
        source.insert_mint(pool.token_mint_a, TOKEN_PROGRAM_ID, 9).await;
        source.insert_mint(pool.token_mint_b, TOKEN_2022_PROGRAM_ID, 6).await;

        let reader = ChainReader::new(source);
        let state = reader.fetch_pool(&address).await.unwrap();
        assert_eq!(state.protocol, Protocol::OrcaWhirlpools);
        assert_eq!(state.spacing_unit, 64);
        assert_eq!(state.token_a.decimals, 9);
        assert_eq!(state.token_b.token_program, TOKEN_2022_PROGRAM_ID);
        assert_eq!(state.rewards.len(), 3);
        assert_eq!(state.active_rewards().count(), 1);
        assert_eq!(state.pricing().sqrt_price_x64, Some(1u128 << 64));
    }

    #[tokio::test]
    async fn test_fetch_lb_pair() {
        let source = Arc::new(MemoryAccounts::default());
        let fixture = LbPairFixture {
            active_id: 8_388_600,
            bin_step: 10,
            token_x_mint: Pubkey::new_unique(),
            token_y_mint: Pubkey::new_unique(),
            reward_mint: Pubkey::default(),
        };
        let address = Pubkey::new_unique();
        source.insert(address, DLMM_PROGRAM_ID, encode_lb_pair(&fixture)).await;
        source.insert_mint(fixture.token_x_mint, TOKEN_PROGRAM_ID, 9).await;
        source.insert_mint(fixture.token_y_mint, TOKEN_PROGRAM_ID, 6).await;

        let state = ChainReader::new(source).fetch_pool(&address).await.unwrap();
        assert_eq!(state.protocol, Protocol::MeteoraDlmm);
        assert_eq!(state.current_index, 8_388_600);
        assert_eq!(state.active_rewards().count(), 0);
        assert_eq!(state.pricing().sqrt_price_x64, None);
    }

    #[tokio::test]
    async fn test_missing_and_foreign_accounts() {
        let source = Arc::new(MemoryAccounts::default());
        let foreign = Pubkey::new_unique();
        source.insert(foreign, Pubkey::new_unique(), vec![0; 64]).await;
        let reader = ChainReader::new(source);

        let missing = Pubkey::new_unique();
        assert_eq!(
            reader.fetch_pool(&missing).await.unwrap_err(),
            ProtocolError::AccountNotFound(missing)
        );
        assert!(matches!(
            reader.fetch_pool(&foreign).await,
            Err(ProtocolError::UnsupportedOwner { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_whirlpool_position() {
        let source = Arc::new(MemoryAccounts::default());
        let address = Pubkey::new_unique();
        let pool = Pubkey::new_unique();
        let data = encode_position(pool, Pubkey::new_unique(), 0, -64, 64, (0, 3), 0);
        source.insert(address, WHIRLPOOL_PROGRAM_ID, data).await;

        let snapshot = ChainReader::new(source).fetch_position(&address).await.unwrap();
        assert_eq!(snapshot.pool, pool);
        assert!(!snapshot.is_funded());
        assert!(snapshot.has_claimable());
        assert_eq!(snapshot.rewards_owed.len(), 3);
    }
}
