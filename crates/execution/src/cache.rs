//! Pool state cache.
//!
//! Entries live until they are invalidated, refreshed or evicted for
//! capacity. Concurrent misses for the same pool share one fetch; a failed
//! fetch is never cached. Invalidating or refreshing a pool detaches any
//! fetch already in flight, so its result is never stored and later callers
//! start a new one.

use clmm_builder_protocols::{PoolFetcher, PoolState, ProtocolError};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::{debug, warn};

struct CacheEntry {
    state: Arc<PoolState>,
    fetched_at: Instant,
}

type InFlight = Arc<OnceCell<Arc<PoolState>>>;

/// Read-through cache of pool snapshots keyed by pool address.
pub struct PoolStateCache {
    fetcher: Arc<dyn PoolFetcher>,
    entries: RwLock<HashMap<Pubkey, CacheEntry>>,
    in_flight: Mutex<HashMap<Pubkey, InFlight>>,
    capacity: usize,
}

impl PoolStateCache {
    /// Creates a cache holding at most `capacity` pools.
    pub fn new(fetcher: Arc<dyn PoolFetcher>, capacity: usize) -> Self {
        Self {
            fetcher,
            entries: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Returns the cached snapshot, fetching it on a miss.
    ///
    /// # Errors
    /// Propagates the fetch error; nothing is stored in that case.
    pub async fn get(&self, pool: &Pubkey) -> Result<Arc<PoolState>, ProtocolError> {
        if let Some(entry) = self.entries.read().await.get(pool) {
            debug!(pool = %pool, "Pool cache hit");
            return Ok(Arc::clone(&entry.state));
        }

        let cell = {
            let mut in_flight = self.in_flight.lock().await;
            Arc::clone(in_flight.entry(*pool).or_default())
        };

        let result = cell
            .get_or_try_init(|| self.fetch_and_store(pool, &cell))
            .await
            .map(Arc::clone);
        self.release(pool, &cell).await;
        result
    }

    /// Fetches `pool` unconditionally and replaces the cached entry.
    ///
    /// Concurrent misses for the same pool wait on this fetch.
    ///
    /// # Errors
    /// Propagates the fetch error; the previous entry is kept in that case.
    pub async fn refresh(&self, pool: &Pubkey) -> Result<Arc<PoolState>, ProtocolError> {
        let cell = InFlight::default();
        self.in_flight.lock().await.insert(*pool, Arc::clone(&cell));

        let result = cell
            .get_or_try_init(|| self.fetch_and_store(pool, &cell))
            .await
            .map(Arc::clone);
        self.release(pool, &cell).await;
        result
    }

    /// Drops the cached entry and detaches any fetch in flight. Returns true
    /// if an entry existed.
    pub async fn invalidate(&self, pool: &Pubkey) -> bool {
        let mut in_flight = self.in_flight.lock().await;
        in_flight.remove(pool);
        self.entries.write().await.remove(pool).is_some()
    }

    /// Drops every entry and detaches every fetch in flight.
    pub async fn clear(&self) {
        let mut in_flight = self.in_flight.lock().await;
        in_flight.clear();
        self.entries.write().await.clear();
    }

    /// Time since the entry for `pool` was fetched.
    pub async fn age(&self, pool: &Pubkey) -> Option<Duration> {
        self.entries
            .read()
            .await
            .get(pool)
            .map(|entry| entry.fetched_at.elapsed())
    }

    /// Number of cached pools.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true when nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn release(&self, pool: &Pubkey, cell: &InFlight) {
        let mut in_flight = self.in_flight.lock().await;
        if in_flight.get(pool).is_some_and(|current| Arc::ptr_eq(current, cell)) {
            in_flight.remove(pool);
        }
    }

    // Stores the result only while `cell` is still the pool's current fetch.
    // Lock order is `in_flight` then `entries`, as in `invalidate`.
    async fn fetch_and_store(&self, pool: &Pubkey, cell: &InFlight) -> Result<Arc<PoolState>, ProtocolError> {
        debug!(pool = %pool, "Fetching pool state");
        let state = Arc::new(self.fetcher.fetch_pool(pool).await?);

        let in_flight = self.in_flight.lock().await;
        if !in_flight.get(pool).is_some_and(|current| Arc::ptr_eq(current, cell)) {
            debug!(pool = %pool, "Pool invalidated during fetch, result not cached");
            return Ok(state);
        }
        let mut entries = self.entries.write().await;
        if !entries.contains_key(pool) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.fetched_at)
                .map(|(key, _)| *key);
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                warn!(evicted = %oldest, capacity = self.capacity, "Pool cache full, evicted oldest entry");
            }
        }
        entries.insert(
            *pool,
            CacheEntry {
                state: Arc::clone(&state),
                fetched_at: Instant::now(),
            },
        );
        Ok(state)
    }
}
