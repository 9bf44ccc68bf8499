//! Connection id derivation
//!
//! The connection id is the keccak256 hash of
//! `msgpack(action) | nonce (8 BE) | vault marker [| vault (20)] [| 0x00 | expiry (8 BE)]`
//! and is the only payload the wallet ever signs for an L1 action.

use ethers::types::Address;
use ethers::utils::keccak256;
use serde::Serialize;

use crate::error::{Error, Result};

/// Marker byte written when no vault address follows
pub const VAULT_ABSENT: u8 = 0;
/// Marker byte written before a 20-byte vault address
pub const VAULT_PRESENT: u8 = 1;
/// Marker byte written before the expiry; the venue defines it as zero
pub const EXPIRY_MARKER: u8 = 0;

/// Canonical MessagePack encoding of an action, map keys in declaration order
pub fn action_bytes<T: Serialize + ?Sized>(action: &T) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(action)
        .map_err(|e| Error::Encoding(format!("Failed to serialize action: {e}")))
}

/// Bytes hashed into the connection id
pub fn preimage<T: Serialize + ?Sized>(
    action: &T,
    nonce: u64,
    vault_address: Option<Address>,
    expires_after: Option<u64>,
) -> Result<Vec<u8>> {
    let mut data = action_bytes(action)?;
    data.extend_from_slice(&nonce.to_be_bytes());

    match vault_address {
        Some(addr) => {
            data.push(VAULT_PRESENT);
            data.extend_from_slice(addr.as_bytes());
        }
        None => data.push(VAULT_ABSENT),
    }

    if let Some(expiry) = expires_after {
        data.push(EXPIRY_MARKER);
        data.extend_from_slice(&expiry.to_be_bytes());
    }

    Ok(data)
}

/// Compute the 32-byte connection id for an action
pub fn connection_id<T: Serialize + ?Sized>(
    action: &T,
    nonce: u64,
    vault_address: Option<Address>,
    expires_after: Option<u64>,
) -> Result<[u8; 32]> {
    let data = preimage(action, nonce, vault_address, expires_after)?;
    Ok(keccak256(data))
}
