//! RPC access behind small traits so callers can be tested without a node.

use crate::error::ProtocolError;
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{hash::Hash, pubkey::Pubkey};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// The parts of an on-chain account the decoders need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAccount {
    /// Owning program.
    pub owner: Pubkey,
    /// Account data.
    pub data: Vec<u8>,
}

/// Reads accounts.
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// Fetches one account. `Ok(None)` if it does not exist.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<RawAccount>, ProtocolError>;

    /// Fetches several accounts in one request, preserving order.
    async fn get_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<RawAccount>>, ProtocolError>;
}

/// Provides a recent blockhash.
#[async_trait]
pub trait BlockhashSource: Send + Sync {
    /// Returns the latest blockhash and the last block height at which it is valid.
    async fn latest_blockhash(&self) -> Result<(Hash, u64), ProtocolError>;
}

/// Solana RPC provider with a per-request timeout.
#[derive(Clone)]
pub struct RpcProvider {
    client: Arc<RpcClient>,
    timeout: Duration,
}

impl RpcProvider {
    /// Creates a provider for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>, commitment: CommitmentConfig, timeout: Duration) -> Self {
        let client = RpcClient::new_with_timeout_and_commitment(url.into(), timeout, commitment);
        Self {
            client: Arc::new(client),
            timeout,
        }
    }

    /// Returns the RPC endpoint URL.
    #[must_use]
    pub fn url(&self) -> String {
        self.client.url()
    }

    async fn bounded<T, E, F>(&self, operation: &'static str, fut: F) -> Result<T, ProtocolError>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ProtocolError::Rpc(format!("{operation}: {e}"))),
            Err(_) => {
                let ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                debug!(operation, timeout_ms = ms, "RPC request timed out");
                Err(ProtocolError::Timeout(ms))
            }
        }
    }
}

#[async_trait]
impl AccountSource for RpcProvider {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<RawAccount>, ProtocolError> {
        let response = self
            .bounded(
                "getAccountInfo",
                self.client
                    .get_account_with_commitment(address, self.client.commitment()),
            )
            .await?;
        Ok(response.value.map(|account| RawAccount {
            owner: account.owner,
            data: account.data,
        }))
    }

    async fn get_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<RawAccount>>, ProtocolError> {
        let response = self
            .bounded(
                "getMultipleAccounts",
                self.client
                    .get_multiple_accounts_with_commitment(addresses, self.client.commitment()),
            )
            .await?;
        Ok(response
            .value
            .into_iter()
            .map(|maybe| {
                maybe.map(|account| RawAccount {
                    owner: account.owner,
                    data: account.data,
                })
            })
            .collect())
    }
}

#[async_trait]
impl BlockhashSource for RpcProvider {
    async fn latest_blockhash(&self) -> Result<(Hash, u64), ProtocolError> {
        self.bounded(
            "getLatestBlockhash",
            self.client
                .get_latest_blockhash_with_commitment(self.client.commitment()),
        )
        .await
    }
}
