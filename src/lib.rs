//! Hyperliquid exchange actions
//!
//! Builds, signs and submits exchange actions:
//! - Canonical decimal encoding of prices, sizes and amounts
//! - Symbol to asset index resolution with a TTL cache
//! - MessagePack action hashing and phantom-agent EIP-712 signing
//! - Submission and typed interpretation of the venue's response

pub mod auth;
pub mod client;
pub mod decimal;
pub mod error;
pub mod exchange;
pub mod hash;
pub mod nonce;
pub mod types;
pub mod universe;

pub use auth::{Signature, TypedDataSigner, Wallet};
pub use client::{Client, ClientConfig, Network, MAINNET_URL, TESTNET_URL};
pub use decimal::DecimalValue;
pub use error::{Error, ErrorKind, Result};
pub use exchange::{
    AssetTransfer, BuilderFee, ExchangeAction, ExchangeResponseData, OrderOutcome, RawResponse,
    SignedRequest, SubmitOptions,
};
pub use types::*;
pub use universe::{AssetUniverse, UniverseCache, UniverseKey, UniverseSource};
