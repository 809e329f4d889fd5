//! Position builder facade.
//!
//! One async method per position operation. Each reads what it needs
//! (pool through the cache, position fresh from chain), runs the pure range
//! and quote engines, composes the instructions and assembles an unsigned
//! transaction.

use crate::assembler::{AssembledTransaction, TransactionAssembler};
use crate::cache::PoolStateCache;
use crate::composer::{InstructionComposer, PositionContext};
use crate::config::BuilderConfig;
use crate::error::{BuildError, BuildResult};
use crate::lifecycle::{Operation, PositionPhase};
use crate::plan::{InstructionPlan, serialize_pubkey};
use chrono::{DateTime, Utc};
use clmm_builder_domain::enums::{AmmModel, Protocol, RiskProfile, TokenSide};
use clmm_builder_domain::error::DomainError;
use clmm_builder_domain::math::price_bin::bin_to_price;
use clmm_builder_domain::math::price_tick::{sqrt_price_x64_to_price, tick_to_price};
use clmm_builder_domain::quote::{DepositQuote, QuoteEngine, QuoteRequest, WithdrawalQuote};
use clmm_builder_domain::range::RangeEngine;
use clmm_builder_domain::value_objects::{Amount, Percentage, Price, Range};
use clmm_builder_protocols::{
    BlockhashSource, ChainReader, ModelExtras, PoolFetcher, PoolState, PositionFetcher, PositionSnapshot,
    RpcProvider, TokenMeta,
};
use rust_decimal::Decimal;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::{info, warn};

/// How the range of a new position is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeSelection {
    /// Derive the range from a risk profile name; unknown names mean medium.
    Profile(String),
    /// Use caller-supplied bounds.
    Explicit(Range),
}

/// Input of [`PositionBuilder::open`].
#[derive(Debug, Clone)]
pub struct OpenRequest {
    /// Pool to open in.
    pub pool: Pubkey,
    /// Wallet paying for and owning the position.
    pub owner: Pubkey,
    /// Range of the position.
    pub range: RangeSelection,
    /// Deposit amount in base units.
    pub amount: u64,
    /// Token `amount` refers to.
    pub side: TokenSide,
    /// Slippage as a percentage (`0.5` is 0.5%); `None` uses the configured default.
    pub slippage: Option<Decimal>,
}

/// Token side of a pool.
#[derive(Debug, Clone, Serialize)]
pub struct TokenInfo {
    pub mint: String,
    pub decimals: u8,
    pub token_program: String,
    pub vault: String,
}

/// Decoded pool summary.
#[derive(Debug, Clone, Serialize)]
pub struct PoolInfo {
    pub address: String,
    pub protocol: Protocol,
    /// Program owning the pool account.
    pub program: String,
    pub model: AmmModel,
    /// Bin step (bps) or tick spacing.
    pub spacing_unit: u16,
    /// Active bin id or current tick.
    pub current_index: i32,
    /// Price of token A in token B, adjusted for decimals.
    pub price: Decimal,
    pub token_a: TokenInfo,
    pub token_b: TokenInfo,
    /// Mints of configured reward slots.
    pub reward_mints: Vec<String>,
    /// Milliseconds since the snapshot was fetched.
    pub cache_age_ms: Option<u128>,
}

/// Decoded position summary.
#[derive(Debug, Clone, Serialize)]
pub struct PositionInfo {
    pub address: String,
    pub pool: String,
    pub protocol: Protocol,
    pub owner: Option<String>,
    pub position_mint: Option<String>,
    pub phase: PositionPhase,
    pub range: Range,
    pub in_range: bool,
    pub liquidity: u128,
    pub fees_owed_a: u64,
    pub fees_owed_b: u64,
    pub rewards_owed: Vec<u64>,
}

/// A computed range with its bound prices.
#[derive(Debug, Clone, Serialize)]
pub struct RangeInfo {
    pub pool: String,
    /// Profile actually applied.
    pub profile: RiskProfile,
    pub current_index: i32,
    pub range: Range,
    pub current_price: Decimal,
    pub lower_price: Decimal,
    pub upper_price: Decimal,
}

/// A deposit quote with amounts also shown in whole tokens.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteInfo {
    #[serde(flatten)]
    pub quote: DepositQuote,
    pub range: Range,
    pub ui_amount_a: Decimal,
    pub ui_amount_b: Decimal,
}

/// An unsigned transaction plus what it does.
#[derive(Debug, Clone, Serialize)]
pub struct BuiltTransaction {
    pub operation: Operation,
    /// Phase of the position while the transaction is pending.
    pub phase: PositionPhase,
    #[serde(serialize_with = "serialize_pubkey")]
    pub pool: Pubkey,
    #[serde(serialize_with = "serialize_pubkey")]
    pub position: Pubkey,
    pub range: Range,
    pub slippage_bps: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<DepositQuote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawal: Option<WithdrawalQuote>,
    pub built_at: DateTime<Utc>,
    #[serde(flatten)]
    pub transaction: AssembledTransaction,
}

/// The two independent transactions of a rebalance: close the old position,
/// then open the new one.
#[derive(Debug, Clone, Serialize)]
pub struct Rebalance {
    pub close: BuiltTransaction,
    pub open: BuiltTransaction,
}

struct Metadata {
    operation: Operation,
    pool: Pubkey,
    range: Range,
    slippage_bps: u16,
    quote: Option<DepositQuote>,
}

/// Builds unsigned position transactions.
pub struct PositionBuilder {
    config: BuilderConfig,
    cache: PoolStateCache,
    positions: Arc<dyn PositionFetcher>,
    assembler: TransactionAssembler,
}

impl PositionBuilder {
    /// Creates a builder from explicit collaborators.
    ///
    /// # Errors
    /// `Config` when the configuration does not validate.
    pub fn new(
        config: BuilderConfig,
        pools: Arc<dyn PoolFetcher>,
        positions: Arc<dyn PositionFetcher>,
        blockhash: Arc<dyn BlockhashSource>,
    ) -> BuildResult<Self> {
        config.validate()?;
        let cache = PoolStateCache::new(pools, config.cache_capacity);
        Ok(Self {
            config,
            cache,
            positions,
            assembler: TransactionAssembler::new(blockhash),
        })
    }

    /// Creates a builder reading from the configured RPC endpoint.
    ///
    /// # Errors
    /// `Config` when the configuration does not validate.
    pub fn from_rpc(config: BuilderConfig) -> BuildResult<Self> {
        config.validate()?;
        let provider = Arc::new(RpcProvider::new(
            config.rpc_url.clone(),
            config.commitment_config()?,
            config.request_timeout(),
        ));
        let reader = Arc::new(ChainReader::new(Arc::clone(&provider)));
        info!(rpc_url = %provider.url(), commitment = %config.commitment, "Position builder ready");
        Self::new(config, reader.clone(), reader, provider)
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// The pool state cache, for explicit refresh and invalidation.
    #[must_use]
    pub fn cache(&self) -> &PoolStateCache {
        &self.cache
    }

    /// Decoded state of `pool`.
    ///
    /// # Errors
    /// `NotFound` for a missing or unparsable pool, `Transport` for RPC failures.
    pub async fn pool_info(&self, pool: &Pubkey) -> BuildResult<PoolInfo> {
        let state = self.cache.get(pool).await?;
        let token = |meta: &TokenMeta| TokenInfo {
            mint: meta.mint.to_string(),
            decimals: meta.decimals,
            token_program: meta.token_program.to_string(),
            vault: meta.vault.to_string(),
        };
        Ok(PoolInfo {
            address: state.address.to_string(),
            protocol: state.protocol,
            program: state.program_id().to_string(),
            model: state.model(),
            spacing_unit: state.spacing_unit,
            current_index: state.current_index,
            price: current_price(&state)?.value,
            token_a: token(&state.token_a),
            token_b: token(&state.token_b),
            reward_mints: state.active_rewards().map(|slot| slot.mint.to_string()).collect(),
            cache_age_ms: self.cache.age(pool).await.map(|age| age.as_millis()),
        })
    }

    /// Decoded state of `position`, read fresh.
    ///
    /// # Errors
    /// `NotFound` for a missing or unparsable position or pool.
    pub async fn position_info(&self, position: &Pubkey) -> BuildResult<PositionInfo> {
        let (pool, snapshot) = self.load(position).await?;
        Ok(PositionInfo {
            address: snapshot.address.to_string(),
            pool: snapshot.pool.to_string(),
            protocol: snapshot.protocol,
            owner: snapshot.owner.map(|owner| owner.to_string()),
            position_mint: snapshot.position_mint.map(|mint| mint.to_string()),
            phase: PositionPhase::of(&snapshot),
            in_range: snapshot.range.contains(pool.current_index),
            range: snapshot.range,
            liquidity: snapshot.liquidity,
            fees_owed_a: snapshot.fees_owed_a,
            fees_owed_b: snapshot.fees_owed_b,
            rewards_owed: snapshot.rewards_owed,
        })
    }

    /// Range for `profile` around the pool's current index.
    ///
    /// # Errors
    /// `NotFound` for a missing pool. Unknown profiles fall back to medium.
    pub async fn calculate_range(&self, pool: &Pubkey, profile: &str) -> BuildResult<RangeInfo> {
        let state = self.cache.get(pool).await?;
        let profile = RiskProfile::parse_lossy(profile);
        let range = profile_range(&state, profile);
        Ok(RangeInfo {
            pool: state.address.to_string(),
            profile,
            current_index: state.current_index,
            range,
            current_price: current_price(&state)?.value,
            lower_price: index_price(&state, range.lower)?.value,
            upper_price: index_price(&state, range.upper)?.value,
        })
    }

    /// Deposit quote for `amount` of `side` over `range`.
    ///
    /// # Errors
    /// `InvalidRange` for `lower >= upper`, `InsufficientInput` for a zero
    /// amount or a side the range cannot take.
    pub async fn quote(
        &self,
        pool: &Pubkey,
        range: Range,
        amount: u64,
        side: TokenSide,
        slippage: Option<Decimal>,
    ) -> BuildResult<QuoteInfo> {
        let state = self.cache.get(pool).await?;
        let slippage_bps = self.slippage_bps(slippage);
        let quote = deposit_quote(&state, range, amount, side, slippage_bps)?;
        Ok(QuoteInfo {
            ui_amount_a: Amount::new(quote.amount_a, state.token_a.decimals).to_decimal()?,
            ui_amount_b: Amount::new(quote.amount_b, state.token_b.decimals).to_decimal()?,
            range,
            quote,
        })
    }

    /// Opens a position and deposits into it.
    ///
    /// # Errors
    /// Range validation, quoting and transport errors.
    pub async fn open(&self, request: OpenRequest) -> BuildResult<BuiltTransaction> {
        let pool = self.cache.get(&request.pool).await?;
        self.open_in(&pool, request).await
    }

    /// Deposits into an existing position over its current range.
    ///
    /// # Errors
    /// `InvalidPhase` for a position that cannot take deposits.
    pub async fn add(
        &self,
        position: &Pubkey,
        owner: &Pubkey,
        amount: u64,
        side: TokenSide,
        slippage: Option<Decimal>,
    ) -> BuildResult<BuiltTransaction> {
        let (pool, snapshot) = self.load(position).await?;
        let slippage_bps = self.slippage_bps(slippage);
        let quote = deposit_quote(&pool, snapshot.range, amount, side, slippage_bps)?;
        let ctx = context(&pool, &snapshot, owner);

        let plan = InstructionComposer::for_model(pool.model()).add(&ctx, &quote)?;
        self.finish(
            plan,
            owner,
            Metadata {
                operation: Operation::Add,
                pool: pool.address,
                range: snapshot.range,
                slippage_bps,
                quote: Some(quote),
            },
        )
        .await
    }

    /// Withdraws `bps` basis points of the position's liquidity.
    ///
    /// # Errors
    /// `InsufficientInput` for an empty position or `bps` outside `1..=10000`.
    pub async fn remove(
        &self,
        position: &Pubkey,
        owner: &Pubkey,
        bps: u16,
        slippage: Option<Decimal>,
    ) -> BuildResult<BuiltTransaction> {
        let (pool, snapshot) = self.load(position).await?;
        let slippage_bps = self.slippage_bps(slippage);
        let ctx = context(&pool, &snapshot, owner);
        let plan = InstructionComposer::for_model(pool.model()).remove(&ctx, bps, slippage_bps)?;
        self.finish(plan, owner, metadata(Operation::Remove, &snapshot, slippage_bps))
            .await
    }

    /// Claims swap fees.
    ///
    /// # Errors
    /// `InsufficientInput` when there is nothing to claim.
    pub async fn collect_fees(&self, position: &Pubkey, owner: &Pubkey) -> BuildResult<BuiltTransaction> {
        let (pool, snapshot) = self.load(position).await?;
        let ctx = context(&pool, &snapshot, owner);
        let plan = InstructionComposer::for_model(pool.model()).collect_fees(&ctx)?;
        self.finish(plan, owner, metadata(Operation::CollectFees, &snapshot, 0))
            .await
    }

    /// Claims every configured reward.
    ///
    /// # Errors
    /// `InsufficientInput` when the pool has no rewards or there is nothing to claim.
    pub async fn collect_rewards(&self, position: &Pubkey, owner: &Pubkey) -> BuildResult<BuiltTransaction> {
        let (pool, snapshot) = self.load(position).await?;
        let ctx = context(&pool, &snapshot, owner);
        let plan = InstructionComposer::for_model(pool.model()).collect_rewards(&ctx)?;
        self.finish(plan, owner, metadata(Operation::CollectRewards, &snapshot, 0))
            .await
    }

    /// Harvests everything, withdraws all liquidity and closes the position.
    ///
    /// # Errors
    /// `InvalidPhase` only for a position that cannot be closed.
    pub async fn close(
        &self,
        position: &Pubkey,
        owner: &Pubkey,
        slippage: Option<Decimal>,
    ) -> BuildResult<BuiltTransaction> {
        let (pool, snapshot) = self.load(position).await?;
        self.close_in(&pool, &snapshot, owner, self.slippage_bps(slippage))
            .await
    }

    /// Moves a position to a fresh `profile` range around the current price.
    ///
    /// Produces two transactions that must land in order: the close of the
    /// old position and the open of the new one. The pool is re-read first so
    /// the new range reflects the current price. `amount` of `side` is the
    /// deposit for the new position.
    ///
    /// # Errors
    /// Anything `close` or `open` returns.
    pub async fn rebalance(
        &self,
        position: &Pubkey,
        owner: &Pubkey,
        profile: &str,
        amount: u64,
        side: TokenSide,
        slippage: Option<Decimal>,
    ) -> BuildResult<Rebalance> {
        let snapshot = self.positions.fetch_position(position).await?;
        let pool = self.cache.refresh(&snapshot.pool).await?;
        let slippage_bps = self.slippage_bps(slippage);

        let mut close = self.close_in(&pool, &snapshot, owner, slippage_bps).await?;
        close.phase = PositionPhase::Rebalancing;

        let open = self
            .open_in(
                &pool,
                OpenRequest {
                    pool: pool.address,
                    owner: *owner,
                    range: RangeSelection::Profile(profile.to_string()),
                    amount,
                    side,
                    slippage,
                },
            )
            .await?;

        info!(
            old_position = %snapshot.address,
            new_position = %open.position,
            old_range = %snapshot.range,
            new_range = %open.range,
            "Built rebalance"
        );
        Ok(Rebalance { close, open })
    }

    async fn open_in(&self, pool: &PoolState, request: OpenRequest) -> BuildResult<BuiltTransaction> {
        let range = match &request.range {
            RangeSelection::Profile(name) => profile_range(pool, RiskProfile::parse_lossy(name)),
            RangeSelection::Explicit(range) => *range,
        };
        let slippage_bps = self.slippage_bps(request.slippage);
        let quote = deposit_quote(pool, range, request.amount, request.side, slippage_bps)?;
        let plan = InstructionComposer::for_model(pool.model()).open(pool, &request.owner, &range, &quote)?;
        self.finish(
            plan,
            &request.owner,
            Metadata {
                operation: Operation::Open,
                pool: pool.address,
                range,
                slippage_bps,
                quote: Some(quote),
            },
        )
        .await
    }

    async fn close_in(
        &self,
        pool: &PoolState,
        snapshot: &PositionSnapshot,
        owner: &Pubkey,
        slippage_bps: u16,
    ) -> BuildResult<BuiltTransaction> {
        let ctx = context(pool, snapshot, owner);
        let plan = InstructionComposer::for_model(pool.model()).close(&ctx, slippage_bps)?;
        self.finish(plan, owner, metadata(Operation::Close, snapshot, slippage_bps))
            .await
    }

    async fn load(&self, position: &Pubkey) -> BuildResult<(Arc<PoolState>, PositionSnapshot)> {
        let snapshot = self.positions.fetch_position(position).await?;
        let pool = self.cache.get(&snapshot.pool).await?;
        Ok((pool, snapshot))
    }

    async fn finish(
        &self,
        plan: InstructionPlan,
        payer: &Pubkey,
        meta: Metadata,
    ) -> BuildResult<BuiltTransaction> {
        let position = plan
            .position
            .ok_or_else(|| BuildError::Encoding("plan does not name a position".to_string()))?;
        let withdrawal = plan.withdrawal.clone();
        let transaction = self.assembler.assemble(plan, payer).await?;

        info!(
            operation = %meta.operation,
            pool = %meta.pool,
            position = %position,
            range = %meta.range,
            instructions = transaction.steps.len(),
            size = transaction.size_bytes,
            "Built transaction"
        );
        Ok(BuiltTransaction {
            operation: meta.operation,
            phase: meta.operation.pending_phase(),
            pool: meta.pool,
            position,
            range: meta.range,
            slippage_bps: meta.slippage_bps,
            quote: meta.quote,
            withdrawal,
            built_at: Utc::now(),
            transaction,
        })
    }

    /// Resolves a caller slippage percentage to basis points, clamped to the
    /// configured maximum.
    fn slippage_bps(&self, slippage: Option<Decimal>) -> u16 {
        let Some(percent) = slippage else {
            return self.config.default_slippage_bps;
        };
        let bps = Percentage::from_percent(percent).to_bps();
        if bps > self.config.max_slippage_bps {
            warn!(
                requested_bps = bps,
                max_bps = self.config.max_slippage_bps,
                "Slippage above maximum, clamping"
            );
            return self.config.max_slippage_bps;
        }
        bps
    }
}

fn context<'a>(pool: &'a PoolState, snapshot: &'a PositionSnapshot, owner: &Pubkey) -> PositionContext<'a> {
    PositionContext {
        pool,
        position: snapshot,
        owner: *owner,
    }
}

fn metadata(operation: Operation, snapshot: &PositionSnapshot, slippage_bps: u16) -> Metadata {
    Metadata {
        operation,
        pool: snapshot.pool,
        range: snapshot.range,
        slippage_bps,
        quote: None,
    }
}

fn profile_range(pool: &PoolState, profile: RiskProfile) -> Range {
    RangeEngine::for_model(pool.model()).compute_for(pool.current_index, pool.spacing_unit, profile)
}

fn deposit_quote(
    pool: &PoolState,
    range: Range,
    amount: u64,
    side: TokenSide,
    slippage_bps: u16,
) -> BuildResult<DepositQuote> {
    let request = QuoteRequest {
        range,
        input_amount: amount,
        side,
        slippage_bps,
    };
    Ok(QuoteEngine::for_model(pool.model()).quote(&pool.pricing(), &request)?)
}

fn index_price(pool: &PoolState, index: i32) -> BuildResult<Price> {
    let raw = match pool.model() {
        AmmModel::Tick => tick_to_price(index),
        AmmModel::Bin => bin_to_price(index, pool.spacing_unit),
    }
    .map_err(DomainError::invalid_range)?;
    Ok(Price::from_raw(raw, pool.token_a.decimals, pool.token_b.decimals)?)
}

// Whirlpools carry the exact sqrt price; the current tick is its floor.
fn current_price(pool: &PoolState) -> BuildResult<Price> {
    match pool.extras {
        ModelExtras::Tick { sqrt_price_x64, .. } => {
            let raw = sqrt_price_x64_to_price(sqrt_price_x64).map_err(DomainError::overflow)?;
            Ok(Price::from_raw(raw, pool.token_a.decimals, pool.token_b.decimals)?)
        }
        ModelExtras::Bin { .. } => index_price(pool, pool.current_index),
    }
}
