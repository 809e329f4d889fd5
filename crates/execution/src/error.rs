//! Errors surfaced by the position builder.

use crate::lifecycle::{Operation, PositionPhase};
use clmm_builder_domain::error::DomainError;
use clmm_builder_protocols::error::ProtocolError;
use thiserror::Error;

/// Errors returned by every builder operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Caller input or on-chain state rules out the request.
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// The RPC node failed or timed out. Safe to retry.
    #[error("Transport error: {0}")]
    Transport(ProtocolError),
    /// The operation is not allowed in the position's current phase.
    #[error("Cannot {operation} a position that is {phase}")]
    InvalidPhase {
        /// Requested operation.
        operation: Operation,
        /// Phase derived from the position account.
        phase: PositionPhase,
    },
    /// The position belongs to a different wallet.
    #[error("Position is owned by {owner}, not {caller}")]
    NotOwner {
        /// Owner recorded on chain.
        owner: String,
        /// Wallet that requested the operation.
        caller: String,
    },
    /// A pool token uses a token program the composer cannot encode for.
    #[error("Mint {mint} uses unsupported token program {program}")]
    UnsupportedTokenProgram {
        /// Token mint.
        mint: String,
        /// Owning token program.
        program: String,
    },
    /// The serialized transaction exceeds the packet size limit.
    #[error("Transaction is {size} bytes, limit is {limit}")]
    TransactionTooLarge {
        /// Serialized size.
        size: usize,
        /// Packet limit.
        limit: usize,
    },
    /// The message could not be compiled or serialized.
    #[error("Failed to encode transaction: {0}")]
    Encoding(String),
    /// A configuration value is malformed.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BuildError {
    /// Returns true only for transport failures.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<ProtocolError> for BuildError {
    fn from(err: ProtocolError) -> Self {
        if err.is_transport() {
            return Self::Transport(err);
        }
        match err {
            ProtocolError::AccountNotFound(address) => {
                Self::Domain(DomainError::not_found(format!("account {address}")))
            }
            other => Self::Domain(DomainError::not_found(other.to_string())),
        }
    }
}

/// Convenience result alias.
pub type BuildResult<T> = Result<T, BuildError>;
