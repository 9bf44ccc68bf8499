//! End-to-end pipeline scenarios against a mocked venue

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::transaction::eip712::TypedData;
use ethers::types::Address;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::{json, Value};

use hyperliquid_actions::decimal::float_to_wire;
use hyperliquid_actions::exchange::response::validate;
use hyperliquid_actions::{
    Client, Error, ErrorKind, MarketKind, Network, OrderGrouping, OrderIntent, RawResponse,
    Result, Side, SubmitOptions, TimeInForce, TypedDataSigner, Wallet,
};

const GOLDEN_ORDER_REQUEST: &str = include_str!("fixtures/order_request.json");

const META_BODY: &str = r#"{"universe":[
    {"name":"ETH","szDecimals":4,"maxLeverage":50},
    {"name":"SOL","szDecimals":2,"maxLeverage":20},
    {"name":"ARB","szDecimals":1,"maxLeverage":10},
    {"name":"BTC","szDecimals":5,"maxLeverage":50}
]}"#;

/// Stands in for an external wallet: always returns the same 65 bytes
#[derive(Clone, Default)]
struct MockSigner {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl TypedDataSigner for MockSigner {
    fn address(&self) -> Address {
        Address::repeat_byte(0xaa)
    }

    async fn sign_typed_data(&self, _typed_data: &TypedData) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut raw = vec![0x11; 32];
        raw.extend_from_slice(&[0x22; 32]);
        raw.push(27);
        Ok(raw)
    }
}

async fn mock_meta(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/info")
        .match_body(Matcher::Json(json!({"type": "meta"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(META_BODY)
        .expect(1)
        .create_async()
        .await
}

fn btc_intent() -> OrderIntent {
    OrderIntent::limit("BTC-USD", Side::Buy, "100000", "0.0001").tif(TimeInForce::Gtc)
}

#[tokio::test]
async fn test_signed_order_matches_golden_body() {
    let mut server = Server::new_async().await;
    let meta = mock_meta(&mut server).await;

    let client = Client::with_base_url(Network::Mainnet, server.url()).unwrap();
    let wallet = Wallet::from_signer(MockSigner::default());

    let action = client
        .build_order_action(&[btc_intent()], OrderGrouping::Na, None)
        .await
        .unwrap();
    let request = client
        .sign_action(&wallet, action, SubmitOptions::new().nonce(1_700_000_000_000))
        .await
        .unwrap();

    let expected: Value = serde_json::from_str(GOLDEN_ORDER_REQUEST).unwrap();
    assert_eq!(serde_json::to_value(&request).unwrap(), expected);

    // key order is part of the contract, not just key presence
    let compact = serde_json::to_string(&request).unwrap();
    assert!(compact.starts_with(r#"{"action":{"type":"order","orders":[{"a":3,"b":true,"p":"100000","s":"0.0001","r":false,"#));

    meta.assert_async().await;
}

#[tokio::test]
async fn test_golden_body_is_posted_to_exchange() {
    let mut server = Server::new_async().await;
    let meta = mock_meta(&mut server).await;
    let golden: Value = serde_json::from_str(GOLDEN_ORDER_REQUEST).unwrap();
    let exchange = server
        .mock("POST", "/exchange")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(golden))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"status":"ok","response":{"type":"order","data":{"statuses":[{"filled":{"totalSz":"0.0001","avgPx":"99990.0","oid":12345}}]}}}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let client = Client::with_base_url(Network::Mainnet, server.url()).unwrap();
    let wallet = Wallet::from_signer(MockSigner::default());
    let outcomes = client
        .place_orders_with_options(
            &wallet,
            vec![btc_intent()],
            OrderGrouping::Na,
            None,
            SubmitOptions::new().nonce(1_700_000_000_000),
        )
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].is_success());
    assert_eq!(outcomes[0].order_id(), Some(12345));

    meta.assert_async().await;
    exchange.assert_async().await;
}

#[test]
fn test_rejected_order_reports_message_and_raw_response() {
    let body = r#"{"status":"ok","response":{"type":"order","data":{"statuses":[{"error":"Insufficient margin"},{"resting":{"oid":77738308}}]}}}"#;
    let raw = RawResponse {
        status: 200,
        body: body.to_string(),
    };

    let err = validate(&raw).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    match err {
        Error::Api { message, raw } => {
            assert_eq!(message, "Insufficient margin");
            assert_eq!(raw, serde_json::from_str::<Value>(body).unwrap());
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[test]
fn test_small_float_price_is_plain_decimal() {
    assert_eq!(float_to_wire(1.23e-7).unwrap(), "0.000000123");
}

#[tokio::test]
async fn test_unknown_symbol_stops_before_signing() {
    let mut server = Server::new_async().await;
    let meta = mock_meta(&mut server).await;
    let exchange = server
        .mock("POST", "/exchange")
        .expect(0)
        .create_async()
        .await;

    let client = Client::with_base_url(Network::Mainnet, server.url()).unwrap();
    let signer = MockSigner::default();
    let calls = Arc::clone(&signer.calls);
    let wallet = Wallet::from_signer(signer);

    let err = client
        .place_order(&wallet, OrderIntent::limit("ZZZ-USD", Side::Buy, "1", "1"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnknownAsset);
    assert!(err.is_pre_flight());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    meta.assert_async().await;
    exchange.assert_async().await;
}

#[tokio::test]
async fn test_universe_fetched_once_across_orders() {
    let mut server = Server::new_async().await;
    let meta = mock_meta(&mut server).await;
    let _exchange = server
        .mock("POST", "/exchange")
        .with_status(200)
        .with_body(
            r#"{"status":"ok","response":{"type":"order","data":{"statuses":[{"resting":{"oid":1}}]}}}"#,
        )
        .expect(3)
        .create_async()
        .await;

    let client = Client::with_base_url(Network::Mainnet, server.url()).unwrap();
    let wallet = Wallet::from_signer(MockSigner::default());
    for symbol in ["BTC-USD", "eth", "SOL-PERP"] {
        client
            .place_order(&wallet, OrderIntent::limit(symbol, Side::Buy, "1", "1"))
            .await
            .unwrap();
    }
    assert_eq!(
        client.resolve_asset("arb", MarketKind::Perp).await.unwrap(),
        2
    );

    meta.assert_async().await;
}
