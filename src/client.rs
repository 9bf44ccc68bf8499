//! HTTP client for the venue's info and exchange endpoints

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::auth::{MAINNET_SOURCE, TESTNET_SOURCE};
use crate::error::{Error, Result};
use crate::nonce::NonceSource;
use crate::types::{MarketKind, MetaRequest, PerpMetaResponse, SpotMetaResponse};
use crate::universe::{AssetUniverse, UniverseCache, UniverseKey, UniverseSource};

/// Base URLs for the venue API
pub const MAINNET_URL: &str = "https://api.hyperliquid.xyz";
pub const TESTNET_URL: &str = "https://api.hyperliquid-testnet.xyz";

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Network configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Mainnet environment
    #[default]
    Mainnet,
    /// Testnet environment
    Testnet,
}

impl Network {
    /// Get the base URL for this network
    pub fn base_url(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_URL,
            Network::Testnet => TESTNET_URL,
        }
    }

    /// Phantom agent source tag signed for this network
    pub fn source(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_SOURCE,
            Network::Testnet => TESTNET_SOURCE,
        }
    }

    pub fn is_mainnet(&self) -> bool {
        matches!(self, Network::Mainnet)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => f.write_str("mainnet"),
            Network::Testnet => f.write_str("testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            other => Err(Error::InvalidParameter(format!("unknown network: {other}"))),
        }
    }
}

/// Client settings, deserializable from any serde format
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub network: Network,
    /// Overrides the network's default API URL
    pub base_url: Option<String>,
    pub request_timeout_ms: u64,
    pub universe_ttl_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            base_url: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            universe_ttl_secs: crate::universe::DEFAULT_UNIVERSE_TTL.as_secs(),
        }
    }
}

impl ClientConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }
}

/// API client
///
/// Clones share the HTTP connection pool, the asset universe cache and the
/// nonce source.
#[derive(Debug, Clone)]
pub struct Client {
    http: ReqwestClient,
    network: Network,
    base_url: String,
    universe: Arc<UniverseCache>,
    nonces: Arc<NonceSource>,
}

impl Client {
    /// Create a new client for the specified network
    pub fn new(network: Network) -> Result<Self> {
        Self::from_config(&ClientConfig::new(network))
    }

    /// Create a new client for mainnet
    pub fn mainnet() -> Result<Self> {
        Self::new(Network::Mainnet)
    }

    /// Create a new client for testnet
    pub fn testnet() -> Result<Self> {
        Self::new(Network::Testnet)
    }

    /// Create a client that talks to a custom endpoint but signs for `network`
    pub fn with_base_url(network: Network, base_url: impl Into<String>) -> Result<Self> {
        Self::from_config(&ClientConfig {
            base_url: Some(base_url.into()),
            ..ClientConfig::new(network)
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let http = ReqwestClient::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(Error::Http)?;

        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(config.network.base_url())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            http,
            network: config.network,
            base_url,
            universe: Arc::new(UniverseCache::with_ttl(Duration::from_secs(
                config.universe_ttl_secs,
            ))),
            nonces: Arc::new(NonceSource::new()),
        })
    }

    /// Use a universe cache shared with other clients
    pub fn with_universe_cache(mut self, cache: Arc<UniverseCache>) -> Self {
        self.universe = cache;
        self
    }

    /// Get the base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the info endpoint URL
    pub fn info_url(&self) -> String {
        format!("{}/info", self.base_url)
    }

    /// Get the exchange endpoint URL
    pub fn exchange_url(&self) -> String {
        format!("{}/exchange", self.base_url)
    }

    /// Get the underlying HTTP client
    pub fn http(&self) -> &ReqwestClient {
        &self.http
    }

    /// Get the current network
    pub fn network(&self) -> Network {
        self.network
    }

    pub fn universe_cache(&self) -> &Arc<UniverseCache> {
        &self.universe
    }

    /// Next nonce, strictly greater than any this client issued before
    pub fn next_nonce(&self) -> Result<u64> {
        self.nonces.next()
    }

    pub(crate) fn observe_nonce(&self, nonce: u64) {
        self.nonces.observe(nonce);
    }

    /// Cache key for this client's universe of the given market
    pub fn universe_key(&self, market: MarketKind) -> UniverseKey {
        UniverseKey {
            network: self.network,
            base_url: self.base_url.clone(),
            market,
        }
    }

    /// Resolve a symbol to its wire asset index
    pub async fn resolve_asset(&self, symbol: &str, market: MarketKind) -> Result<u32> {
        let key = self.universe_key(market);
        self.universe.resolve(symbol, &key, self).await
    }

    /// Refetch the universe now, e.g. after an [`Error::UnknownAsset`] for a
    /// newly listed asset
    pub async fn refresh_universe(&self, market: MarketKind) -> Result<Arc<AssetUniverse>> {
        let key = self.universe_key(market);
        self.universe.refresh(&key, self).await
    }

    /// POST a request to the info endpoint
    pub async fn post_info<T, R>(&self, request: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.info_url();
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            return Err(Error::Transport(format!(
                "HTTP {} - {}",
                status.as_u16(),
                body
            )));
        }

        serde_json::from_str(&body).map_err(Error::Json)
    }
}

#[async_trait]
impl UniverseSource for Client {
    async fn fetch_universe(&self, market: MarketKind) -> Result<Vec<String>> {
        let request = MetaRequest::new(market);
        debug!(url = %self.info_url(), request_type = request.request_type, "fetching universe");

        let names = match market {
            MarketKind::Perp => {
                let meta: PerpMetaResponse = self.post_info(&request).await?;
                meta.universe.into_iter().map(|asset| asset.name).collect()
            }
            MarketKind::Spot => {
                let meta: SpotMetaResponse = self.post_info(&request).await?;
                meta.pair_names()
            }
        };
        Ok(names)
    }
}
