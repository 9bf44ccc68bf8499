//! Asset universe cache
//!
//! Maps human-readable symbols to the numeric asset indices used on the wire.
//! Universes are fetched lazily per (network, endpoint, market) and replaced
//! wholesale once they are older than the TTL, so a reader always sees one
//! complete universe.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::client::Network;
use crate::error::{Error, Result};
use crate::types::MarketKind;

/// Default age after which a cached universe is refetched
pub const DEFAULT_UNIVERSE_TTL: Duration = Duration::from_secs(5 * 60);

/// Identifies one cached universe
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniverseKey {
    pub network: Network,
    pub base_url: String,
    pub market: MarketKind,
}

/// Uppercased base component of a symbol: `"btc-usd"` and `"BTC/USDC"` both
/// become `"BTC"`
pub fn base_symbol(symbol: &str) -> String {
    symbol
        .split(['-', '/'])
        .next()
        .unwrap_or(symbol)
        .trim()
        .to_uppercase()
}

/// An ordered list of asset names; an asset's index is its position plus the
/// market's offset
#[derive(Debug)]
pub struct AssetUniverse {
    names: Vec<String>,
    index: HashMap<String, u32>,
    offset: u32,
    fetched_at: Instant,
}

impl AssetUniverse {
    pub fn new(names: Vec<String>, market: MarketKind) -> Self {
        let offset = market.index_offset();
        let mut index = HashMap::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            // first listing wins when two names share a base
            index
                .entry(base_symbol(name))
                .or_insert(offset + position as u32);
        }

        Self {
            names,
            index,
            offset,
            fetched_at: Instant::now(),
        }
    }

    /// Asset names in index order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Wire index of a symbol, matched case-insensitively on its base component
    pub fn index_of(&self, symbol: &str) -> Option<u32> {
        self.index.get(&base_symbol(symbol)).copied()
    }

    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

/// Where universes come from. [`crate::Client`] implements this against the
/// venue's info endpoint.
#[async_trait]
pub trait UniverseSource: Send + Sync {
    /// Asset names for the market, in index order
    async fn fetch_universe(&self, market: MarketKind) -> Result<Vec<String>>;
}

/// TTL cache of asset universes, shareable between clients
///
/// Refreshes are single-flight per key: concurrent resolutions of one key share
/// a fetch, while a slow fetch for one key never blocks another.
#[derive(Debug)]
pub struct UniverseCache {
    ttl: Duration,
    entries: RwLock<HashMap<UniverseKey, Arc<AssetUniverse>>>,
    refresh_locks: Mutex<HashMap<UniverseKey, Arc<Mutex<()>>>>,
}

impl Default for UniverseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl UniverseCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_UNIVERSE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            refresh_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached universe for the key regardless of its age
    pub async fn get(&self, key: &UniverseKey) -> Option<Arc<AssetUniverse>> {
        self.entries.read().await.get(key).cloned()
    }

    async fn refresh_lock(&self, key: &UniverseKey) -> Arc<Mutex<()>> {
        let mut locks = self.refresh_locks.lock().await;
        Arc::clone(locks.entry(key.clone()).or_default())
    }

    async fn fresh(&self, key: &UniverseKey) -> Option<Arc<AssetUniverse>> {
        self.get(key)
            .await
            .filter(|universe| universe.is_fresh(self.ttl))
    }

    /// Current universe for the key, fetching it when missing or stale
    pub async fn universe<S>(&self, key: &UniverseKey, source: &S) -> Result<Arc<AssetUniverse>>
    where
        S: UniverseSource + ?Sized,
    {
        if let Some(universe) = self.fresh(key).await {
            return Ok(universe);
        }

        let lock = self.refresh_lock(key).await;
        let _guard = lock.lock().await;
        // another task may have refreshed while we waited
        if let Some(universe) = self.fresh(key).await {
            return Ok(universe);
        }
        self.fetch(key, source).await
    }

    /// Fetch the universe for the key now, ignoring any cached entry
    pub async fn refresh<S>(&self, key: &UniverseKey, source: &S) -> Result<Arc<AssetUniverse>>
    where
        S: UniverseSource + ?Sized,
    {
        let lock = self.refresh_lock(key).await;
        let _guard = lock.lock().await;
        self.fetch(key, source).await
    }

    async fn fetch<S>(&self, key: &UniverseKey, source: &S) -> Result<Arc<AssetUniverse>>
    where
        S: UniverseSource + ?Sized,
    {
        let names = source.fetch_universe(key.market).await?;
        let universe = Arc::new(AssetUniverse::new(names, key.market));
        info!(
            network = ?key.network,
            market = ?key.market,
            assets = universe.len(),
            "refreshed asset universe"
        );

        self.entries
            .write()
            .await
            .insert(key.clone(), Arc::clone(&universe));
        Ok(universe)
    }

    /// Resolve a symbol to its wire asset index
    pub async fn resolve<S>(&self, symbol: &str, key: &UniverseKey, source: &S) -> Result<u32>
    where
        S: UniverseSource + ?Sized,
    {
        let universe = self.universe(key, source).await?;
        let index = universe
            .index_of(symbol)
            .ok_or_else(|| Error::UnknownAsset(symbol.to_string()))?;
        debug!(symbol, index, "resolved asset");
        Ok(index)
    }

    /// Drop the cached universe so the next resolution refetches it
    pub async fn invalidate(&self, key: &UniverseKey) -> bool {
        self.entries.write().await.remove(key).is_some()
    }
}
