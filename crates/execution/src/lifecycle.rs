//! Position life-cycle: phases and the operations allowed in each.
//!
//! ```text
//! Unopened -> Open -> Funded <-> Rebalancing
//!                \       |
//!                 `-> Unwinding -> Closed
//! ```
//!
//! Phases are derived from the position account on every call; nothing is
//! persisted between calls.

use crate::error::{BuildError, BuildResult};
use clmm_builder_domain::error::DomainError;
use clmm_builder_protocols::state::PositionSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionPhase {
    /// No position account exists yet.
    Unopened,
    /// Account exists with zero liquidity.
    Open,
    /// Account holds liquidity.
    Funded,
    /// Being moved to a new range (close then open).
    Rebalancing,
    /// Close sequence in flight.
    Unwinding,
    /// Account closed.
    Closed,
}

impl PositionPhase {
    /// Derives the phase of an existing position account.
    #[must_use]
    pub fn of(position: &PositionSnapshot) -> Self {
        if position.is_funded() {
            Self::Funded
        } else {
            Self::Open
        }
    }
}

impl fmt::Display for PositionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unopened => "unopened",
            Self::Open => "open",
            Self::Funded => "funded",
            Self::Rebalancing => "rebalancing",
            Self::Unwinding => "unwinding",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// A position operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// Create the position account and deposit.
    Open,
    /// Deposit into an existing position.
    Add,
    /// Withdraw part of the liquidity.
    Remove,
    /// Claim swap fees.
    CollectFees,
    /// Claim every configured reward.
    CollectRewards,
    /// Harvest, withdraw everything and close the account.
    Close,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Add => "add",
            Self::Remove => "remove",
            Self::CollectFees => "collect-fees",
            Self::CollectRewards => "collect-rewards",
            Self::Close => "close",
        };
        f.write_str(name)
    }
}

impl Operation {
    /// Phases from which the operation may start.
    #[must_use]
    pub fn allowed_from(&self) -> &'static [PositionPhase] {
        use PositionPhase::{Funded, Open, Unopened};
        match self {
            Self::Open => &[Unopened],
            Self::Add | Self::Close => &[Open, Funded],
            Self::Remove | Self::CollectFees | Self::CollectRewards => &[Funded],
        }
    }

    /// Phase the position is in once the operation lands.
    #[must_use]
    pub fn resulting_phase(&self) -> PositionPhase {
        match self {
            Self::Open | Self::Add | Self::Remove => PositionPhase::Funded,
            Self::CollectFees | Self::CollectRewards => PositionPhase::Funded,
            Self::Close => PositionPhase::Closed,
        }
    }

    /// Phase reported while the built transaction is pending.
    #[must_use]
    pub fn pending_phase(&self) -> PositionPhase {
        match self {
            Self::Close => PositionPhase::Unwinding,
            other => other.resulting_phase(),
        }
    }

    /// Checks that the operation may run against `position`.
    ///
    /// Harvesting an unfunded position is allowed while fees or rewards are
    /// still owed to it.
    ///
    /// # Errors
    /// `InsufficientInput` when removing or harvesting a position with no
    /// liquidity and nothing claimable, `InvalidPhase` otherwise.
    pub fn check(&self, position: &PositionSnapshot) -> BuildResult<()> {
        let phase = PositionPhase::of(position);
        if self.allowed_from().contains(&phase) {
            return Ok(());
        }
        match self {
            Self::CollectFees | Self::CollectRewards if position.has_claimable() => Ok(()),
            Self::Remove | Self::CollectFees | Self::CollectRewards => {
                Err(BuildError::Domain(DomainError::insufficient_input(format!(
                    "position {} has no liquidity and nothing to claim",
                    position.address
                ))))
            }
            _ => Err(BuildError::InvalidPhase {
                operation: *self,
                phase,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clmm_builder_domain::enums::Protocol;
    use clmm_builder_domain::value_objects::Range;
    use solana_sdk::pubkey::Pubkey;

    fn snapshot(liquidity: u128, fees: u64) -> PositionSnapshot {
        PositionSnapshot {
            address: Pubkey::new_unique(),
            pool: Pubkey::new_unique(),
            protocol: Protocol::MeteoraDlmm,
            owner: None,
            position_mint: None,
            range: Range::new(0, 10),
            liquidity,
            fees_owed_a: fees,
            fees_owed_b: 0,
            rewards_owed: vec![0, 0],
        }
    }

    #[test]
    fn test_phase_derivation() {
        assert_eq!(PositionPhase::of(&snapshot(0, 0)), PositionPhase::Open);
        assert_eq!(PositionPhase::of(&snapshot(1, 0)), PositionPhase::Funded);
    }

    #[test]
    fn test_open_position_rules() {
        let open = snapshot(0, 0);
        assert!(Operation::Add.check(&open).is_ok());
        assert!(Operation::Close.check(&open).is_ok());
        assert!(matches!(
            Operation::Remove.check(&open),
            Err(BuildError::Domain(DomainError::InsufficientInput(_)))
        ));
        assert!(Operation::CollectFees.check(&open).is_err());
        assert!(matches!(
            Operation::Open.check(&open),
            Err(BuildError::InvalidPhase {
                operation: Operation::Open,
                phase: PositionPhase::Open
            })
        ));
    }

    #[test]
    fn test_harvest_unfunded_with_owed_fees() {
        let position = snapshot(0, 10);
        assert!(Operation::CollectFees.check(&position).is_ok());
        assert!(Operation::Remove.check(&position).is_err());
    }

    #[test]
    fn test_funded_rules() {
        let funded = snapshot(5, 0);
        for op in [
            Operation::Add,
            Operation::Remove,
            Operation::CollectFees,
            Operation::CollectRewards,
            Operation::Close,
        ] {
            assert!(op.check(&funded).is_ok(), "{op} should be allowed");
        }
        assert_eq!(Operation::Close.resulting_phase(), PositionPhase::Closed);
        assert_eq!(Operation::Close.pending_phase(), PositionPhase::Unwinding);
    }

    #[test]
    fn test_error_message() {
        let err = Operation::Open.check(&snapshot(5, 0)).unwrap_err();
        assert_eq!(err.to_string(), "Cannot open a position that is funded");
    }
}
