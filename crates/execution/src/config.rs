//! Builder configuration.

use crate::error::{BuildError, BuildResult};
use serde::{Deserialize, Serialize};
use solana_commitment_config::CommitmentConfig;
use std::time::Duration;

/// Configuration for the position builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Solana RPC endpoint.
    pub rpc_url: String,
    /// Commitment used for account and blockhash reads.
    pub commitment: String,
    /// Timeout for each RPC request in milliseconds.
    pub request_timeout_ms: u64,
    /// Slippage applied when the caller does not supply one, in basis points.
    pub default_slippage_bps: u16,
    /// Upper bound on caller-supplied slippage, in basis points.
    pub max_slippage_bps: u16,
    /// Maximum number of pools kept in the cache.
    pub cache_capacity: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            request_timeout_ms: 10_000,
            default_slippage_bps: 50,  // 0.5%
            max_slippage_bps: 1_000,   // 10%
            cache_capacity: 512,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> BuildResult<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| BuildError::Config(format!("{key}={raw} is not valid"))),
        Err(_) => Ok(None),
    }
}

impl BuilderConfig {
    /// Reads overrides from `RPC_URL`, `RPC_COMMITMENT`, `RPC_TIMEOUT_MS`,
    /// `DEFAULT_SLIPPAGE_BPS` and `POOL_CACHE_CAPACITY`.
    ///
    /// # Errors
    /// Returns `Config` when a variable is present but malformed.
    pub fn from_env() -> BuildResult<Self> {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("RPC_URL") {
            config.rpc_url = url;
        }
        if let Ok(commitment) = std::env::var("RPC_COMMITMENT") {
            config.commitment = commitment;
        }
        if let Some(ms) = env_parse("RPC_TIMEOUT_MS")? {
            config.request_timeout_ms = ms;
        }
        if let Some(bps) = env_parse("DEFAULT_SLIPPAGE_BPS")? {
            config.default_slippage_bps = bps;
        }
        if let Some(capacity) = env_parse("POOL_CACHE_CAPACITY")? {
            config.cache_capacity = capacity;
        }
        config.validate()?;
        Ok(config)
    }

    /// Sets the RPC URL.
    #[must_use]
    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = url.into();
        self
    }

    /// Sets the default slippage.
    #[must_use]
    pub fn with_default_slippage_bps(mut self, bps: u16) -> Self {
        self.default_slippage_bps = bps;
        self
    }

    /// Sets the cache capacity.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Checks value ranges.
    ///
    /// # Errors
    /// Returns `Config` for an unknown commitment, zero timeout or capacity,
    /// or a default slippage above the maximum.
    pub fn validate(&self) -> BuildResult<()> {
        self.commitment_config()?;
        if self.request_timeout_ms == 0 {
            return Err(BuildError::Config("request_timeout_ms must be positive".into()));
        }
        if self.cache_capacity == 0 {
            return Err(BuildError::Config("cache_capacity must be positive".into()));
        }
        if self.default_slippage_bps > self.max_slippage_bps {
            return Err(BuildError::Config(format!(
                "default_slippage_bps {} exceeds max_slippage_bps {}",
                self.default_slippage_bps, self.max_slippage_bps
            )));
        }
        Ok(())
    }

    /// Parsed commitment level.
    ///
    /// # Errors
    /// Returns `Config` for anything but processed, confirmed or finalized.
    pub fn commitment_config(&self) -> BuildResult<CommitmentConfig> {
        match self.commitment.to_ascii_lowercase().as_str() {
            "processed" => Ok(CommitmentConfig::processed()),
            "confirmed" => Ok(CommitmentConfig::confirmed()),
            "finalized" => Ok(CommitmentConfig::finalized()),
            other => Err(BuildError::Config(format!("unknown commitment {other}"))),
        }
    }

    /// Per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
