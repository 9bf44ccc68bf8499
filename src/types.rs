//! Common types: order intents, enums shared by actions and responses, and the
//! metadata shapes returned by the info endpoint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::decimal::DecimalValue;
use crate::error::{Error, Result};

// ============================================================================
// Common Enums
// ============================================================================

/// Time in force options for orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum TimeInForce {
    /// Good till cancelled - order remains active until filled or cancelled
    #[default]
    #[serde(rename = "Gtc")]
    Gtc,
    /// Immediate or cancel - fill what's possible immediately, cancel the rest
    #[serde(rename = "Ioc")]
    Ioc,
    /// Add liquidity only - order is rejected if it would take liquidity
    #[serde(rename = "Alo")]
    Alo,
}

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Buy order
    #[serde(rename = "B")]
    Buy,
    /// Sell order
    #[serde(rename = "A")]
    Sell,
}

impl Side {
    pub fn is_buy(self) -> bool {
        matches!(self, Side::Buy)
    }
}

/// Trigger type for conditional orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    /// Take profit
    Tp,
    /// Stop loss
    Sl,
}

/// Order grouping type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderGrouping {
    /// No grouping
    #[default]
    Na,
    /// Normal take profit / stop loss
    NormalTpsl,
    /// Position-based take profit / stop loss
    PositionTpsl,
}

impl TimeInForce {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeInForce::Gtc => "Gtc",
            TimeInForce::Ioc => "Ioc",
            TimeInForce::Alo => "Alo",
        }
    }
}

impl TriggerType {
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerType::Tp => "tp",
            TriggerType::Sl => "sl",
        }
    }
}

impl OrderGrouping {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderGrouping::Na => "na",
            OrderGrouping::NormalTpsl => "normalTpsl",
            OrderGrouping::PositionTpsl => "positionTpsl",
        }
    }
}

// These values are hashed as MessagePack strings, so they are written with
// serialize_str rather than as unit variants.
macro_rules! serialize_as_str {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(
                    &self,
                    serializer: S,
                ) -> std::result::Result<S::Ok, S::Error> {
                    serializer.serialize_str(self.as_str())
                }
            }
        )*
    };
}

serialize_as_str!(TimeInForce, TriggerType, OrderGrouping);

/// Which asset universe a symbol is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MarketKind {
    #[default]
    Perp,
    Spot,
}

impl MarketKind {
    /// Value of the `type` field in the info request
    pub fn meta_request_type(self) -> &'static str {
        match self {
            MarketKind::Perp => "meta",
            MarketKind::Spot => "spotMeta",
        }
    }

    /// Offset added to the universe position to form the wire asset index
    pub fn index_offset(self) -> u32 {
        match self {
            MarketKind::Perp => 0,
            MarketKind::Spot => 10_000,
        }
    }
}

// ============================================================================
// Client order id
// ============================================================================

/// 16-byte client-assigned order id, written as `0x` + 32 hex digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cloid([u8; 16]);

impl Cloid {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Cloid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Cloid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != 32 {
            return Err(Error::InvalidParameter(format!(
                "cloid must be 32 hex digits, got {}",
                digits.len()
            )));
        }
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| Error::InvalidParameter(format!("Invalid cloid hex: {e}")))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Cloid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Cloid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Order intents
// ============================================================================

/// Trigger parameters for stop loss / take profit orders
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub trigger_price: DecimalValue,
    pub is_market: bool,
    pub tpsl: TriggerType,
}

/// A caller's order, before asset resolution and encoding
#[derive(Debug, Clone, PartialEq)]
pub struct OrderIntent {
    pub symbol: String,
    pub market: MarketKind,
    pub side: Side,
    pub price: DecimalValue,
    pub size: DecimalValue,
    pub time_in_force: Option<TimeInForce>,
    pub reduce_only: bool,
    pub cloid: Option<Cloid>,
    pub trigger: Option<Trigger>,
}

impl OrderIntent {
    /// Limit order, good-till-cancel unless changed with [`OrderIntent::tif`]
    pub fn limit(
        symbol: impl Into<String>,
        side: Side,
        price: impl Into<DecimalValue>,
        size: impl Into<DecimalValue>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            market: MarketKind::Perp,
            side,
            price: price.into(),
            size: size.into(),
            time_in_force: None,
            reduce_only: false,
            cloid: None,
            trigger: None,
        }
    }

    /// Trigger order (stop loss / take profit), limit execution when triggered
    pub fn trigger(
        symbol: impl Into<String>,
        side: Side,
        price: impl Into<DecimalValue>,
        size: impl Into<DecimalValue>,
        trigger_price: impl Into<DecimalValue>,
        tpsl: TriggerType,
    ) -> Self {
        Self {
            trigger: Some(Trigger {
                trigger_price: trigger_price.into(),
                is_market: false,
                tpsl,
            }),
            ..Self::limit(symbol, side, price, size)
        }
    }

    /// Set the time in force (ignored for trigger orders)
    pub fn tif(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = Some(tif);
        self
    }

    /// Set reduce only flag
    pub fn reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }

    /// Set client order ID
    pub fn cloid(mut self, cloid: Cloid) -> Self {
        self.cloid = Some(cloid);
        self
    }

    /// Resolve the symbol against the spot universe
    pub fn spot(mut self) -> Self {
        self.market = MarketKind::Spot;
        self
    }

    /// Execute a trigger order at market once triggered
    pub fn market(mut self) -> Self {
        if let Some(trigger) = self.trigger.as_mut() {
            trigger.is_market = true;
        }
        self
    }
}

// ============================================================================
// Info Endpoint Types
// ============================================================================

/// Request body for the metadata endpoints
#[derive(Debug, Clone, Serialize)]
pub struct MetaRequest {
    #[serde(rename = "type")]
    pub request_type: &'static str,
}

impl MetaRequest {
    pub fn new(market: MarketKind) -> Self {
        Self {
            request_type: market.meta_request_type(),
        }
    }
}

/// Perpetual asset metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerpAssetMeta {
    pub name: String,
    #[serde(default)]
    pub sz_decimals: u8,
    #[serde(default)]
    pub max_leverage: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_isolated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_delisted: Option<bool>,
}

/// Perpetuals metadata response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerpMetaResponse {
    pub universe: Vec<PerpAssetMeta>,
}

/// Spot token metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotToken {
    pub name: String,
    pub index: u32,
    #[serde(default)]
    pub sz_decimals: u8,
    #[serde(default)]
    pub wei_decimals: u8,
}

/// Spot pair metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotPair {
    pub name: String,
    pub tokens: Vec<u32>,
    pub index: u32,
    #[serde(default)]
    pub is_canonical: bool,
}

/// Spot metadata response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotMetaResponse {
    pub tokens: Vec<SpotToken>,
    pub universe: Vec<SpotPair>,
}

impl SpotMetaResponse {
    /// Pair names in universe order, with `@N` aliases replaced by the base
    /// token's name
    pub fn pair_names(&self) -> Vec<String> {
        self.universe
            .iter()
            .map(|pair| {
                if !pair.name.starts_with('@') {
                    return pair.name.clone();
                }
                pair.tokens
                    .first()
                    .and_then(|base| self.tokens.iter().find(|token| token.index == *base))
                    .map(|token| token.name.clone())
                    .unwrap_or_else(|| pair.name.clone())
            })
            .collect()
    }
}
