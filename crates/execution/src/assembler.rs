//! Transaction assembly.
//!
//! Compiles an instruction plan into an unsigned v0 transaction. Every
//! required signer gets a default signature slot; the caller's wallet and the
//! generated co-signers fill them in before submission.

use crate::error::{BuildError, BuildResult};
use crate::plan::{GeneratedKey, InstructionPlan, PlanStep};
use base64::{Engine as _, engine::general_purpose};
use clmm_builder_protocols::BlockhashSource;
use serde::Serialize;
use solana_sdk::hash::Hash;
use solana_sdk::message::{VersionedMessage, v0};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum serialized transaction size accepted by the network.
pub const PACKET_DATA_SIZE: usize = 1232;

/// An unsigned transaction ready for signing.
#[derive(Debug, Clone, Serialize)]
pub struct AssembledTransaction {
    /// Bincode-serialized `VersionedTransaction`, base64 encoded.
    pub transaction_base64: String,
    /// Blockhash the message was compiled against.
    pub blockhash: String,
    /// Last block height at which the blockhash is accepted.
    pub last_valid_block_height: u64,
    /// Serialized size in bytes.
    pub size_bytes: usize,
    /// Every account that must sign, payer first.
    pub required_signers: Vec<String>,
    /// Keys generated for new accounts, with their secrets.
    pub required_co_signers: Vec<GeneratedKey>,
    /// Labels of the instructions, in order.
    pub steps: Vec<PlanStep>,
}

/// Compiles `plan` for `payer` against a known blockhash.
///
/// # Errors
/// `Encoding` for an empty plan, a message that fails to compile or a
/// generated key the message does not require. `TransactionTooLarge` above
/// [`PACKET_DATA_SIZE`].
pub fn compile(
    plan: InstructionPlan,
    payer: &Pubkey,
    blockhash: Hash,
    last_valid_block_height: u64,
) -> BuildResult<AssembledTransaction> {
    if plan.is_empty() {
        return Err(BuildError::Encoding("plan has no instructions".to_string()));
    }

    let message = v0::Message::try_compile(payer, &plan.instructions, &[], blockhash)
        .map_err(|e| BuildError::Encoding(e.to_string()))?;
    let required = usize::from(message.header.num_required_signatures);
    let signers: Vec<Pubkey> = message.account_keys.iter().take(required).copied().collect();

    if let Some(missing) = plan.co_signers.iter().find(|key| !signers.contains(&key.pubkey)) {
        return Err(BuildError::Encoding(format!(
            "generated key {} is not a signer of the message",
            missing.pubkey
        )));
    }

    let transaction = VersionedTransaction {
        signatures: vec![Signature::default(); required],
        message: VersionedMessage::V0(message),
    };
    let bytes = bincode::serialize(&transaction).map_err(|e| BuildError::Encoding(e.to_string()))?;
    if bytes.len() > PACKET_DATA_SIZE {
        return Err(BuildError::TransactionTooLarge {
            size: bytes.len(),
            limit: PACKET_DATA_SIZE,
        });
    }
    debug!(size = bytes.len(), signers = required, "Compiled v0 message");

    Ok(AssembledTransaction {
        transaction_base64: general_purpose::STANDARD.encode(&bytes),
        blockhash: blockhash.to_string(),
        last_valid_block_height,
        size_bytes: bytes.len(),
        required_signers: signers.iter().map(ToString::to_string).collect(),
        required_co_signers: plan.co_signers,
        steps: plan.steps,
    })
}

/// Fetches a blockhash and compiles plans into transactions.
pub struct TransactionAssembler {
    blockhash: Arc<dyn BlockhashSource>,
}

impl TransactionAssembler {
    /// Creates an assembler over a blockhash source.
    #[must_use]
    pub fn new(blockhash: Arc<dyn BlockhashSource>) -> Self {
        Self { blockhash }
    }

    /// Assembles `plan` with `payer` as fee payer.
    ///
    /// # Errors
    /// `Transport` when the blockhash fetch fails or times out, plus
    /// everything [`compile`] returns.
    pub async fn assemble(&self, plan: InstructionPlan, payer: &Pubkey) -> BuildResult<AssembledTransaction> {
        let (blockhash, last_valid_block_height) = self.blockhash.latest_blockhash().await?;
        let assembled = compile(plan, payer, blockhash, last_valid_block_height)?;
        info!(
            payer = %payer,
            blockhash = %assembled.blockhash,
            last_valid_block_height,
            size = assembled.size_bytes,
            "Assembled transaction"
        );
        Ok(assembled)
    }
}
