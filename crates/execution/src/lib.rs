//! Transaction composition for concentrated-liquidity positions.
//!
//! This crate turns position operations into unsigned Solana transactions:
//! - Pool state cache with single-flight fetches and explicit invalidation
//! - Position life-cycle phases and operation preconditions
//! - Instruction composition per pool model, including the close sequence
//! - v0 transaction assembly with generated co-signer keys
//! - The `PositionBuilder` facade tying it together

/// Prelude module for convenient imports.
pub mod prelude;

/// Transaction assembly.
pub mod assembler;
/// Pool state cache.
pub mod cache;
/// Instruction composition.
pub mod composer;
/// Builder configuration.
pub mod config;
/// Error types.
pub mod error;
/// Position life-cycle.
pub mod lifecycle;
/// Instruction plans and generated keys.
pub mod plan;
/// Position builder facade.
pub mod service;

pub use error::{BuildError, BuildResult};
pub use service::PositionBuilder;
