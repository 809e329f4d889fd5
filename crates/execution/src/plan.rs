//! Ordered instruction plans and the single-use keys they require.

use clmm_builder_domain::quote::WithdrawalQuote;
use serde::{Deserialize, Serialize, Serializer};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use std::fmt;
use zeroize::Zeroizing;

/// Secret key of a keypair generated for one transaction.
///
/// The material is wiped on drop and never shown by `Debug`.
#[derive(Clone)]
pub struct OwnedSecret(Zeroizing<String>);

impl OwnedSecret {
    /// Base58 encoding of the 64-byte keypair, as accepted by wallets.
    #[must_use]
    pub fn expose_base58(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for OwnedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OwnedSecret(<redacted>)")
    }
}

impl Serialize for OwnedSecret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose_base58())
    }
}

/// A keypair created for a new account that must co-sign the transaction.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedKey {
    /// Public key, as a base58 string.
    #[serde(serialize_with = "serialize_pubkey")]
    pub pubkey: Pubkey,
    /// Secret key for the caller to co-sign with.
    pub secret: OwnedSecret,
}

impl GeneratedKey {
    /// Generates a fresh keypair.
    #[must_use]
    pub fn generate() -> Self {
        let keypair = Keypair::new();
        Self {
            pubkey: keypair.pubkey(),
            secret: OwnedSecret(Zeroizing::new(keypair.to_base58_string())),
        }
    }
}

pub(crate) fn serialize_pubkey<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(key)
}

/// What an instruction in a plan does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "step")]
pub enum PlanStep {
    /// Create the position account.
    CreatePosition,
    /// Deposit liquidity.
    AddLiquidity,
    /// Checkpoint owed fees and rewards before harvesting.
    UpdateFees,
    /// Claim swap fees.
    ClaimFees,
    /// Claim one reward slot.
    ClaimReward {
        /// Reward slot index.
        index: u8,
    },
    /// Withdraw `bps` of the liquidity.
    RemoveLiquidity {
        /// Share removed, in basis points.
        bps: u16,
    },
    /// Close the position account.
    ClosePosition,
}

/// Ordered instructions for one atomic transaction.
#[derive(Debug, Clone, Default)]
pub struct InstructionPlan {
    /// Position the plan acts on, including a newly created one.
    pub position: Option<Pubkey>,
    /// Expected withdrawal, when the plan removes liquidity with bounds.
    pub withdrawal: Option<WithdrawalQuote>,
    /// Labels, one per instruction.
    pub steps: Vec<PlanStep>,
    /// Instructions in execution order.
    pub instructions: Vec<Instruction>,
    /// Keys generated for new accounts.
    pub co_signers: Vec<GeneratedKey>,
}

impl InstructionPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty plan for `position`.
    #[must_use]
    pub fn for_position(position: Pubkey) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// Appends an instruction.
    pub fn push(&mut self, step: PlanStep, instruction: Instruction) {
        self.steps.push(step);
        self.instructions.push(instruction);
    }

    /// Adds a generated co-signer.
    pub fn add_co_signer(&mut self, key: GeneratedKey) {
        self.co_signers.push(key);
    }

    /// Number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true when the plan has no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
