use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Supported liquidity protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    /// Orca Whirlpools (tick model).
    OrcaWhirlpools,
    /// Meteora DLMM (bin model).
    MeteoraDlmm,
}

impl Protocol {
    /// Returns the pricing model used by the protocol.
    #[must_use]
    pub fn model(&self) -> AmmModel {
        match self {
            Self::OrcaWhirlpools => AmmModel::Tick,
            Self::MeteoraDlmm => AmmModel::Bin,
        }
    }
}

/// Price discretization model of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmmModel {
    /// Fixed price steps indexed by bin id.
    Bin,
    /// Continuous price space indexed by ticks aligned to a spacing.
    Tick,
}

impl fmt::Display for AmmModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bin => write!(f, "bin"),
            Self::Tick => write!(f, "tick"),
        }
    }
}

/// Named range-width preset.
///
/// Parsing never fails: an unrecognized name degrades to [`RiskProfile::Medium`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskProfile {
    /// Narrow range, highest fee capture and highest rebalance frequency.
    High,
    /// Balanced default.
    #[default]
    Medium,
    /// Wide range.
    Low,
}

impl RiskProfile {
    /// Parses a profile name, falling back to `Medium` for unknown values.
    #[must_use]
    pub fn parse_lossy(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            other => {
                warn!(profile = other, "Unknown risk profile, using medium");
                Self::Medium
            }
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl From<&str> for RiskProfile {
    fn from(value: &str) -> Self {
        Self::parse_lossy(value)
    }
}

impl From<String> for RiskProfile {
    fn from(value: String) -> Self {
        Self::parse_lossy(&value)
    }
}

impl From<RiskProfile> for String {
    fn from(value: RiskProfile) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which token of the pair an amount refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenSide {
    /// Token A (Whirlpool) / token X (DLMM).
    A,
    /// Token B (Whirlpool) / token Y (DLMM).
    B,
}
