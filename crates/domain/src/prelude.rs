//! Prelude module for convenient imports.

pub use crate::enums::{AmmModel, Protocol, RiskProfile, TokenSide};
pub use crate::error::{DomainError, DomainResult};
pub use crate::quote::{DepositQuote, PoolPricing, QuoteEngine, QuoteRequest, WithdrawalQuote};
pub use crate::range::{RangeEngine, RangeProfile, RangeStrategy, calculate_range};
pub use crate::value_objects::{Amount, Percentage, Price, Range};
