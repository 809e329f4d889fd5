//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use clmm_builder_execution::prelude::*;
//! ```

// Assembly
pub use crate::assembler::{AssembledTransaction, PACKET_DATA_SIZE, TransactionAssembler};

// Cache
pub use crate::cache::PoolStateCache;

// Composition
pub use crate::composer::{
    BinComposer, InstructionComposer, PositionComposer, PositionContext, TickComposer, close_sequence,
};

// Configuration and errors
pub use crate::config::BuilderConfig;
pub use crate::error::{BuildError, BuildResult};

// Life-cycle
pub use crate::lifecycle::{Operation, PositionPhase};

// Plans
pub use crate::plan::{GeneratedKey, InstructionPlan, OwnedSecret, PlanStep};

// Facade
pub use crate::service::{
    BuiltTransaction, OpenRequest, PoolInfo, PositionBuilder, PositionInfo, QuoteInfo, RangeInfo,
    RangeSelection, Rebalance,
};
