//! Protocol adapter errors.

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Errors raised while talking to the chain or decoding its accounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The RPC node returned an error or could not be reached.
    #[error("RPC error: {0}")]
    Rpc(String),
    /// An RPC request did not complete within the configured timeout.
    #[error("RPC request timed out after {0} ms")]
    Timeout(u64),
    /// The account does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(Pubkey),
    /// The account exists but its data does not match the expected layout.
    #[error("Failed to parse {kind} account {address}: {reason}")]
    Parse {
        /// Account kind being decoded.
        kind: &'static str,
        /// Account address.
        address: Pubkey,
        /// What went wrong.
        reason: String,
    },
    /// The account belongs to a program this crate has no decoder for.
    #[error("Account {address} is owned by unsupported program {owner}")]
    UnsupportedOwner {
        /// Account address.
        address: Pubkey,
        /// Owning program.
        owner: Pubkey,
    },
}

impl ProtocolError {
    /// Creates a `Parse` error.
    pub fn parse(kind: &'static str, address: Pubkey, reason: impl Into<String>) -> Self {
        Self::Parse {
            kind,
            address,
            reason: reason.into(),
        }
    }

    /// Returns true for network failures that may succeed on retry.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Rpc(_) | Self::Timeout(_))
    }
}
