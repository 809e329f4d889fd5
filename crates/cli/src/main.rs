//! Command line interface for the concentrated-liquidity transaction builder.
//!
//! Every command prints JSON on stdout; logs go to stderr.
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use clmm_builder_domain::enums::TokenSide;
use clmm_builder_domain::value_objects::Range;
use clmm_builder_domain::value_objects::amount::parse_base_units;
use clmm_builder_execution::config::BuilderConfig;
use clmm_builder_execution::service::{OpenRequest, PositionBuilder, RangeSelection};
use dotenv::dotenv;
use rust_decimal::Decimal;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clmm-builder")]
#[command(about = "Unsigned transaction builder for concentrated-liquidity positions", long_about = None)]
struct Cli {
    /// RPC endpoint, overriding RPC_URL
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    /// Token A (Whirlpool) or X (DLMM)
    A,
    /// Token B (Whirlpool) or Y (DLMM)
    B,
}

impl From<Side> for TokenSide {
    fn from(side: Side) -> Self {
        match side {
            Side::A => TokenSide::A,
            Side::B => TokenSide::B,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show a decoded pool
    Pool {
        /// Pool address
        pool: Pubkey,
    },
    /// Show a decoded position and its phase
    Position {
        /// Position address
        position: Pubkey,
    },
    /// Compute the range for a risk profile
    Range {
        /// Pool address
        pool: Pubkey,

        /// Risk profile: high, medium or low
        #[arg(short, long, default_value = "medium")]
        profile: String,
    },
    /// Quote a deposit
    Quote {
        /// Pool address
        pool: Pubkey,

        /// Amount in base units
        #[arg(short, long, value_parser = parse_amount)]
        amount: u64,

        /// Token the amount refers to
        #[arg(short, long, value_enum, default_value_t = Side::A)]
        side: Side,

        /// Risk profile used when no explicit bounds are given
        #[arg(short, long, default_value = "medium")]
        profile: String,

        /// Explicit lower bound (bin id or tick)
        #[arg(long, requires = "upper", allow_hyphen_values = true)]
        lower: Option<i32>,

        /// Explicit upper bound (bin id or tick)
        #[arg(long, requires = "lower", allow_hyphen_values = true)]
        upper: Option<i32>,

        /// Slippage in percent, e.g. 0.5
        #[arg(long)]
        slippage: Option<Decimal>,
    },
    /// Open a position and deposit into it
    Open {
        /// Pool address
        pool: Pubkey,

        /// Wallet paying for and owning the position
        #[arg(short, long)]
        owner: Pubkey,

        /// Amount in base units
        #[arg(short, long, value_parser = parse_amount)]
        amount: u64,

        /// Token the amount refers to
        #[arg(short, long, value_enum, default_value_t = Side::A)]
        side: Side,

        /// Risk profile used when no explicit bounds are given
        #[arg(short, long, default_value = "medium")]
        profile: String,

        /// Explicit lower bound (bin id or tick)
        #[arg(long, requires = "upper", allow_hyphen_values = true)]
        lower: Option<i32>,

        /// Explicit upper bound (bin id or tick)
        #[arg(long, requires = "lower", allow_hyphen_values = true)]
        upper: Option<i32>,

        /// Slippage in percent, e.g. 0.5
        #[arg(long)]
        slippage: Option<Decimal>,
    },
    /// Deposit into an existing position
    Add {
        /// Position address
        position: Pubkey,

        /// Position owner
        #[arg(short, long)]
        owner: Pubkey,

        /// Amount in base units
        #[arg(short, long, value_parser = parse_amount)]
        amount: u64,

        /// Token the amount refers to
        #[arg(short, long, value_enum, default_value_t = Side::A)]
        side: Side,

        /// Slippage in percent, e.g. 0.5
        #[arg(long)]
        slippage: Option<Decimal>,
    },
    /// Withdraw part of a position's liquidity
    Remove {
        /// Position address
        position: Pubkey,

        /// Position owner
        #[arg(short, long)]
        owner: Pubkey,

        /// Share to withdraw in basis points (10000 = everything)
        #[arg(short, long, default_value_t = 10_000)]
        bps: u16,

        /// Slippage in percent, e.g. 0.5
        #[arg(long)]
        slippage: Option<Decimal>,
    },
    /// Claim swap fees
    CollectFees {
        /// Position address
        position: Pubkey,

        /// Position owner
        #[arg(short, long)]
        owner: Pubkey,
    },
    /// Claim every configured reward
    CollectRewards {
        /// Position address
        position: Pubkey,

        /// Position owner
        #[arg(short, long)]
        owner: Pubkey,
    },
    /// Harvest, withdraw and close a position
    Close {
        /// Position address
        position: Pubkey,

        /// Position owner
        #[arg(short, long)]
        owner: Pubkey,

        /// Slippage in percent, e.g. 0.5
        #[arg(long)]
        slippage: Option<Decimal>,
    },
    /// Close a position and open a new one around the current price
    Rebalance {
        /// Position address
        position: Pubkey,

        /// Position owner
        #[arg(short, long)]
        owner: Pubkey,

        /// Deposit for the new position, in base units
        #[arg(short, long, value_parser = parse_amount)]
        amount: u64,

        /// Token the amount refers to
        #[arg(short, long, value_enum, default_value_t = Side::A)]
        side: Side,

        /// Risk profile of the new range
        #[arg(short, long, default_value = "medium")]
        profile: String,

        /// Slippage in percent, e.g. 0.5
        #[arg(long)]
        slippage: Option<Decimal>,
    },
}

fn range_selection(profile: &str, lower: Option<i32>, upper: Option<i32>) -> Result<RangeSelection> {
    match (lower, upper) {
        (Some(lower), Some(upper)) => Ok(RangeSelection::Explicit(Range::new(lower, upper))),
        (None, None) => Ok(RangeSelection::Profile(profile.to_string())),
        _ => bail!("--lower and --upper must be given together"),
    }
}

fn parse_amount(input: &str) -> std::result::Result<u64, String> {
    parse_base_units(input).map_err(|e| e.to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = BuilderConfig::from_env().context("Invalid builder configuration")?;
    if let Some(url) = cli.rpc_url {
        config = config.with_rpc_url(url);
    }
    debug!(rpc_url = %config.rpc_url, commitment = %config.commitment, "Loaded configuration");
    let builder = PositionBuilder::from_rpc(config)?;

    match cli.command {
        Commands::Pool { pool } => print_json(&builder.pool_info(&pool).await?),
        Commands::Position { position } => print_json(&builder.position_info(&position).await?),
        Commands::Range { pool, profile } => print_json(&builder.calculate_range(&pool, &profile).await?),
        Commands::Quote {
            pool,
            amount,
            side,
            profile,
            lower,
            upper,
            slippage,
        } => {
            let range = match range_selection(&profile, lower, upper)? {
                RangeSelection::Explicit(range) => range,
                RangeSelection::Profile(name) => builder.calculate_range(&pool, &name).await?.range,
            };
            print_json(&builder.quote(&pool, range, amount, side.into(), slippage).await?)
        }
        Commands::Open {
            pool,
            owner,
            amount,
            side,
            profile,
            lower,
            upper,
            slippage,
        } => {
            let request = OpenRequest {
                pool,
                owner,
                range: range_selection(&profile, lower, upper)?,
                amount,
                side: side.into(),
                slippage,
            };
            print_json(&builder.open(request).await?)
        }
        Commands::Add {
            position,
            owner,
            amount,
            side,
            slippage,
        } => print_json(&builder.add(&position, &owner, amount, side.into(), slippage).await?),
        Commands::Remove {
            position,
            owner,
            bps,
            slippage,
        } => print_json(&builder.remove(&position, &owner, bps, slippage).await?),
        Commands::CollectFees { position, owner } => {
            print_json(&builder.collect_fees(&position, &owner).await?)
        }
        Commands::CollectRewards { position, owner } => {
            print_json(&builder.collect_rewards(&position, &owner).await?)
        }
        Commands::Close {
            position,
            owner,
            slippage,
        } => print_json(&builder.close(&position, &owner, slippage).await?),
        Commands::Rebalance {
            position,
            owner,
            amount,
            side,
            profile,
            slippage,
        } => print_json(
            &builder
                .rebalance(&position, &owner, &profile, amount, side.into(), slippage)
                .await?,
        ),
    }
}
