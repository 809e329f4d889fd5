//! Pure domain logic for concentrated-liquidity position building.
//!
//! This crate provides the chain-agnostic core:
//! - Price and liquidity math for the bin and tick models
//! - Range calculation from risk profiles
//! - Deposit and withdrawal quoting with slippage bounds
//! - Value objects and the domain error taxonomy

/// Prelude module for convenient imports.
pub mod prelude;

/// Shared enums.
pub mod enums;
/// Domain error types.
pub mod error;
/// Price and liquidity math.
pub mod math;
/// Quote engine.
pub mod quote;
/// Range engine.
pub mod range;
/// Value objects.
pub mod value_objects;

pub use error::{DomainError, DomainResult};
