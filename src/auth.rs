//! Signing for L1 actions
//!
//! Every action is reduced to a connection id (see [`crate::hash`]) and the
//! wallet signs a phantom `Agent` EIP-712 message carrying that id. The signing
//! capability itself is external: anything implementing [`TypedDataSigner`]
//! can back a [`Wallet`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::core::k256::ecdsa::SigningKey;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{
    transaction::eip712::{EIP712Domain, Eip712DomainType, TypedData, Types},
    Address, H256,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::Network;
use crate::error::{Error, Result};

/// EIP-712 domain separator for L1 actions
const DOMAIN_NAME: &str = "Exchange";
const DOMAIN_VERSION: &str = "1";
const DOMAIN_CHAIN_ID: u64 = 1337;

/// Source identifier for the phantom agent
pub(crate) const MAINNET_SOURCE: &str = "a";
pub(crate) const TESTNET_SOURCE: &str = "b";

const SIGNATURE_LEN: usize = 65;

/// Signature components for API submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub r: H256,
    pub s: H256,
    pub v: u8,
}

impl Signature {
    /// Create a new signature from components, normalizing the recovery byte
    pub fn new(r: H256, s: H256, v: u8) -> Self {
        Self {
            r,
            s,
            v: normalize_v(v),
        }
    }

    /// Split a raw `r || s || v` signature
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(Error::MalformedSignature(format!(
                "expected {SIGNATURE_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self::new(
            H256::from_slice(&bytes[0..32]),
            H256::from_slice(&bytes[32..64]),
            bytes[64],
        ))
    }
}

/// Map any recovery byte onto 27 or 28
fn normalize_v(raw: u8) -> u8 {
    let v = if raw < 27 { raw + 27 } else { raw };
    match v {
        27 | 28 => v,
        v if v % 2 == 1 => 27,
        _ => 28,
    }
}

/// An external capability that signs EIP-712 typed data for one account
#[async_trait]
pub trait TypedDataSigner: Send + Sync {
    /// Account the signatures belong to
    fn address(&self) -> Address;

    /// Sign the typed data, returning the raw 65-byte `r || s || v` signature
    async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<Vec<u8>>;
}

#[async_trait]
impl TypedDataSigner for LocalWallet {
    fn address(&self) -> Address {
        Signer::address(self)
    }

    async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<Vec<u8>> {
        let signature = Signer::sign_typed_data(self, typed_data)
            .await
            .map_err(|e| Error::Auth(format!("Failed to sign: {e}")))?;
        Ok(signature.to_vec())
    }
}

/// Account used to sign actions. A watch-only wallet knows its address but
/// cannot sign.
#[derive(Clone)]
pub struct Wallet {
    signer: Option<Arc<dyn TypedDataSigner>>,
    address: Address,
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("can_sign", &self.can_sign())
            .finish()
    }
}

impl Wallet {
    /// Create a wallet from a private key hex string
    ///
    /// The private key should be a 32-byte hex string (with or without 0x prefix).
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let key = private_key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);

        let key_bytes =
            hex::decode(key).map_err(|e| Error::Auth(format!("Invalid private key hex: {e}")))?;

        let key_bytes: [u8; 32] = key_bytes.as_slice().try_into().map_err(|_| {
            Error::Auth(format!(
                "Private key must be 32 bytes, got {}",
                key_bytes.len()
            ))
        })?;

        Self::from_bytes(&key_bytes)
    }

    /// Create a wallet from raw private key bytes
    pub fn from_bytes(private_key: &[u8; 32]) -> Result<Self> {
        let signing_key = SigningKey::from_bytes(private_key.into())
            .map_err(|e| Error::Auth(format!("Invalid private key: {e}")))?;

        Ok(Self::from_signer(LocalWallet::from(signing_key)))
    }

    /// Wrap an external signing capability
    pub fn from_signer(signer: impl TypedDataSigner + 'static) -> Self {
        let address = signer.address();
        Self {
            signer: Some(Arc::new(signer)),
            address,
        }
    }

    /// A wallet that can be inspected but not used to sign
    pub fn watch_only(address: Address) -> Self {
        Self {
            signer: None,
            address,
        }
    }

    /// Get the wallet's Ethereum address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Whether the wallet holds a signing capability
    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    /// Sign a connection id as a phantom agent for the given network
    pub async fn sign_connection_id(
        &self,
        connection_id: [u8; 32],
        network: Network,
    ) -> Result<Signature> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            Error::SigningUnavailable(format!("wallet {:?} is watch-only", self.address))
        })?;

        let typed_data = agent_typed_data(network.source(), connection_id);
        let raw = signer.sign_typed_data(&typed_data).await?;
        let signature = Signature::from_bytes(&raw)?;

        debug!(address = ?self.address, source = network.source(), "signed connection id");
        Ok(signature)
    }
}

/// Create the EIP-712 typed data for the phantom agent
pub fn agent_typed_data(source: &str, connection_id: [u8; 32]) -> TypedData {
    let mut types = Types::new();

    types.insert(
        "EIP712Domain".to_string(),
        vec![
            field("name", "string"),
            field("version", "string"),
            field("chainId", "uint256"),
            field("verifyingContract", "address"),
        ],
    );
    types.insert(
        "Agent".to_string(),
        vec![field("source", "string"), field("connectionId", "bytes32")],
    );

    let domain = EIP712Domain {
        name: Some(DOMAIN_NAME.to_string()),
        version: Some(DOMAIN_VERSION.to_string()),
        chain_id: Some(DOMAIN_CHAIN_ID.into()),
        verifying_contract: Some(Address::zero()),
        salt: None,
    };

    let mut message = BTreeMap::new();
    message.insert(
        "source".to_string(),
        serde_json::Value::String(source.to_string()),
    );
    message.insert(
        "connectionId".to_string(),
        serde_json::Value::String(format!("0x{}", hex::encode(connection_id))),
    );

    TypedData {
        types,
        domain,
        primary_type: "Agent".to_string(),
        message,
    }
}

fn field(name: &str, ty: &str) -> Eip712DomainType {
    Eip712DomainType {
        name: name.to_string(),
        r#type: ty.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TEST_PRIVATE_KEY: &str =
        "0xe908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e";

    /// Returns a fixed signature with the given recovery byte
    struct FixedSigner {
        v: u8,
        calls: AtomicUsize,
    }

    impl FixedSigner {
        fn new(v: u8) -> Self {
            Self {
                v,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TypedDataSigner for FixedSigner {
        fn address(&self) -> Address {
            Address::repeat_byte(0xaa)
        }

        async fn sign_typed_data(&self, _typed_data: &TypedData) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut raw = vec![0x11; 32];
            raw.extend_from_slice(&[0x22; 32]);
            raw.push(self.v);
            Ok(raw)
        }
    }

    struct ShortSigner;

    #[async_trait]
    impl TypedDataSigner for ShortSigner {
        fn address(&self) -> Address {
            Address::zero()
        }

        async fn sign_typed_data(&self, _typed_data: &TypedData) -> Result<Vec<u8>> {
            Ok(vec![0u8; 64])
        }
    }

    #[test]
    fn test_wallet_creation_from_hex() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let wallet2 = Wallet::from_private_key(&TEST_PRIVATE_KEY[2..]).unwrap();

        assert_eq!(wallet.address(), wallet2.address());
        assert!(wallet.can_sign());
    }

    #[test]
    fn test_wallet_creation_from_bytes() {
        let bytes: [u8; 32] = hex::decode(&TEST_PRIVATE_KEY[2..])
            .unwrap()
            .try_into()
            .unwrap();
        let wallet = Wallet::from_bytes(&bytes).unwrap();
        assert_eq!(
            wallet.address(),
            Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap().address()
        );
    }

    #[test]
    fn test_invalid_private_key() {
        assert!(matches!(
            Wallet::from_private_key("0x1234"),
            Err(Error::Auth(_))
        ));
        assert!(matches!(
            Wallet::from_private_key("0xGGGG"),
            Err(Error::Auth(_))
        ));
    }

    #[test]
    fn test_v_normalization() {
        for (raw, expected) in [(0, 27), (1, 28), (27, 27), (28, 28), (35, 27), (36, 28)] {
            let mut bytes = vec![0u8; 64];
            bytes.push(raw);
            let sig = Signature::from_bytes(&bytes).unwrap();
            assert_eq!(sig.v, expected, "raw v {raw}");
        }
    }

    #[test]
    fn test_signature_length_is_checked() {
        for len in [0, 64, 66] {
            let result = Signature::from_bytes(&vec![0u8; len]);
            assert!(matches!(result, Err(Error::MalformedSignature(_))));
        }
    }

    #[test]
    fn test_signature_serialization() {
        let sig = Signature::new(
            H256::from_low_u64_be(0x1234),
            H256::from_low_u64_be(0x5678),
            1,
        );

        let json = serde_json::to_value(sig).unwrap();
        assert_eq!(
            json["r"],
            "0x0000000000000000000000000000000000000000000000000000000000001234"
        );
        assert_eq!(json["v"], 28);

        let parsed: Signature = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, sig);
    }

    #[tokio::test]
    async fn test_known_agent_signatures() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let connection_id =
            H256::from_str("0xde6c4037798a4434ca03cd05f00e3b803126221375cd1e7eaaaf041768be06eb")
                .unwrap();

        let cases = [
            (
                Network::Mainnet,
                "fa8a41f6a3fa728206df80801a83bcbfbab08649cd34d9c0bfba7c7b2f99340f53a00226604567b98a1492803190d65a201d6805e5831b7044f17fd530aec7841c",
            ),
            (
                Network::Testnet,
                "1713c0fc661b792a50e8ffdd59b637b1ed172d9a3aa4d801d9d88646710fb74b33959f4d075a7ccbec9f2374a6da21ffa4448d58d0413a0d335775f680a881431c",
            ),
        ];

        for (network, expected) in cases {
            let sig = wallet
                .sign_connection_id(connection_id.0, network)
                .await
                .unwrap();
            let mut raw = sig.r.as_bytes().to_vec();
            raw.extend_from_slice(sig.s.as_bytes());
            raw.push(sig.v);
            assert_eq!(hex::encode(raw), expected, "{network:?}");
        }
    }

    #[tokio::test]
    async fn test_external_signer_is_normalized() {
        let wallet = Wallet::from_signer(FixedSigner::new(0));
        let sig = wallet
            .sign_connection_id([7u8; 32], Network::Mainnet)
            .await
            .unwrap();
        assert_eq!(sig.r, H256::repeat_byte(0x11));
        assert_eq!(sig.s, H256::repeat_byte(0x22));
        assert_eq!(sig.v, 27);
        assert_eq!(wallet.address(), Address::repeat_byte(0xaa));
    }

    #[tokio::test]
    async fn test_short_signature_is_malformed() {
        let wallet = Wallet::from_signer(ShortSigner);
        let result = wallet.sign_connection_id([0u8; 32], Network::Testnet).await;
        assert!(matches!(result, Err(Error::MalformedSignature(_))));
    }

    #[tokio::test]
    async fn test_watch_only_wallet_cannot_sign() {
        let wallet = Wallet::watch_only(Address::repeat_byte(0x01));
        assert!(!wallet.can_sign());

        let result = wallet.sign_connection_id([0u8; 32], Network::Mainnet).await;
        assert!(matches!(result, Err(Error::SigningUnavailable(_))));
    }

    #[tokio::test]
    async fn test_mainnet_vs_testnet_different_signatures() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let mainnet = wallet
            .sign_connection_id([9u8; 32], Network::Mainnet)
            .await
            .unwrap();
        let testnet = wallet
            .sign_connection_id([9u8; 32], Network::Testnet)
            .await
            .unwrap();
        assert_ne!(mainnet.r, testnet.r);
    }

    #[test]
    fn test_wallet_debug() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let debug_str = format!("{wallet:?}");

        assert!(!debug_str.contains("e908f86d"));
        assert!(debug_str.contains("Wallet"));
        assert!(debug_str.contains("address"));
    }

    #[test]
    fn test_wallet_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Wallet>();
        assert_sync::<Wallet>();
    }

    #[test]
    fn test_agent_typed_data() {
        let typed_data = agent_typed_data(MAINNET_SOURCE, [0u8; 32]);

        assert_eq!(typed_data.primary_type, "Agent");
        assert!(typed_data.types.contains_key("Agent"));
        assert!(typed_data.types.contains_key("EIP712Domain"));
        assert_eq!(typed_data.domain.name, Some("Exchange".to_string()));
        assert_eq!(typed_data.domain.version, Some("1".to_string()));
        assert_eq!(typed_data.domain.chain_id, Some(1337.into()));
        assert_eq!(typed_data.domain.verifying_contract, Some(Address::zero()));
        assert_eq!(typed_data.message["source"], "a");
        assert_eq!(
            typed_data.message["connectionId"],
            format!("0x{}", "00".repeat(32))
        );
    }

    #[tokio::test]
    async fn test_signer_called_once_per_signature() {
        let signer = Arc::new(FixedSigner::new(28));
        struct Shared(Arc<FixedSigner>);

        #[async_trait]
        impl TypedDataSigner for Shared {
            fn address(&self) -> Address {
                self.0.address()
            }
            async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<Vec<u8>> {
                self.0.sign_typed_data(typed_data).await
            }
        }

        let wallet = Wallet::from_signer(Shared(signer.clone()));
        wallet
            .sign_connection_id([1u8; 32], Network::Mainnet)
            .await
            .unwrap();
        assert_eq!(signer.calls.load(Ordering::SeqCst), 1);
    }
}
