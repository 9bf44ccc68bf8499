//! Wire representation of exchange actions
//!
//! Field declaration order in these structs is the serialization order, and the
//! serialization order is hashed. Do not reorder fields.

use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::types::{Cloid, OrderGrouping, TimeInForce, TriggerType};

/// Limit order specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrderType {
    pub tif: TimeInForce,
}

/// Trigger order specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerOrderType {
    pub is_market: bool,
    pub trigger_px: String,
    pub tpsl: TriggerType,
}

/// Order type specification (limit or trigger)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderTypeSpec {
    Limit { limit: LimitOrderType },
    Trigger { trigger: TriggerOrderType },
}

/// Individual order for placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWire {
    /// Asset index
    pub a: u32,
    /// Is buy
    pub b: bool,
    /// Price
    pub p: String,
    /// Size
    pub s: String,
    /// Reduce only
    pub r: bool,
    /// Order type (limit or trigger)
    pub t: OrderTypeSpec,
    /// Client order ID (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c: Option<Cloid>,
}

/// Builder fee specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderFee {
    /// Builder address, lowercase hex
    pub b: String,
    /// Fee in tenths of a basis point
    pub f: u64,
}

impl BuilderFee {
    pub fn new(builder: Address, fee_tenths_bps: u64) -> Self {
        Self {
            b: format!("{builder:?}"),
            f: fee_tenths_bps,
        }
    }
}

/// Order batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAction {
    pub orders: Vec<OrderWire>,
    pub grouping: OrderGrouping,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder: Option<BuilderFee>,
}

/// Withdrawal to an external address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawAction {
    pub destination: String,
    pub amount: String,
    pub time: u64,
}

/// Move USD between the spot and perp balances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdClassTransferAction {
    pub amount: String,
    pub to_perp: bool,
    pub nonce: u64,
}

/// Move USD between the master account and a subaccount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubAccountTransferAction {
    pub sub_account_user: String,
    pub is_deposit: bool,
    /// Micro-USD (6 decimals)
    pub usd: u64,
}

/// Send a token to another address or between dexes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAssetAction {
    pub destination: String,
    pub source_dex: String,
    pub destination_dex: String,
    pub token: String,
    pub amount: String,
    pub from_sub_account: String,
    pub nonce: u64,
}

/// Update leverage action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeverageAction {
    pub asset: u32,
    pub is_cross: bool,
    pub leverage: u32,
}

/// Every action this crate can sign. The `type` tag is always the first key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExchangeAction {
    Order(OrderAction),
    #[serde(rename = "withdraw3")]
    Withdraw(WithdrawAction),
    UsdClassTransfer(UsdClassTransferAction),
    SubAccountTransfer(SubAccountTransferAction),
    SendAsset(SendAssetAction),
    UpdateLeverage(UpdateLeverageAction),
}

impl ExchangeAction {
    /// Value of the `type` tag on the wire
    pub fn action_type(&self) -> &'static str {
        match self {
            ExchangeAction::Order(_) => "order",
            ExchangeAction::Withdraw(_) => "withdraw3",
            ExchangeAction::UsdClassTransfer(_) => "usdClassTransfer",
            ExchangeAction::SubAccountTransfer(_) => "subAccountTransfer",
            ExchangeAction::SendAsset(_) => "sendAsset",
            ExchangeAction::UpdateLeverage(_) => "updateLeverage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn limit_order() -> OrderWire {
        OrderWire {
            a: 0,
            b: true,
            p: "50000.0".to_string(),
            s: "0.1".to_string(),
            r: false,
            t: OrderTypeSpec::Limit {
                limit: LimitOrderType {
                    tif: TimeInForce::Gtc,
                },
            },
            c: None,
        }
    }

    #[test]
    fn test_order_wire_field_order() {
        let json = serde_json::to_string(&limit_order()).unwrap();
        assert_eq!(
            json,
            r#"{"a":0,"b":true,"p":"50000.0","s":"0.1","r":false,"t":{"limit":{"tif":"Gtc"}}}"#
        );
    }

    #[test]
    fn test_trigger_order_wire_serialization() {
        let order = OrderWire {
            t: OrderTypeSpec::Trigger {
                trigger: TriggerOrderType {
                    is_market: true,
                    trigger_px: "49000.0".to_string(),
                    tpsl: TriggerType::Sl,
                },
            },
            ..limit_order()
        };

        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains(r#""t":{"trigger":{"isMarket":true,"triggerPx":"49000.0","tpsl":"sl"}}"#));
    }

    #[test]
    fn test_order_action_tag_comes_first() {
        let action = ExchangeAction::Order(OrderAction {
            orders: vec![limit_order()],
            grouping: OrderGrouping::Na,
            builder: None,
        });

        let json = serde_json::to_string(&action).unwrap();
        assert!(json.starts_with(r#"{"type":"order","orders":["#));
        assert!(json.ends_with(r#""grouping":"na"}"#));
        assert!(!json.contains("builder"));
    }

    #[test]
    fn test_order_action_with_builder_fee() {
        let builder: Address = "0x1234567890123456789012345678901234567890".parse().unwrap();
        let action = ExchangeAction::Order(OrderAction {
            orders: vec![limit_order()],
            grouping: OrderGrouping::Na,
            builder: Some(BuilderFee::new(builder, 100)),
        });

        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(
            value["builder"],
            json!({"b": "0x1234567890123456789012345678901234567890", "f": 100})
        );
    }

    #[test]
    fn test_action_type_tags() {
        let cases = [
            (
                ExchangeAction::Withdraw(WithdrawAction {
                    destination: "0xabc".to_string(),
                    amount: "1".to_string(),
                    time: 1,
                }),
                "withdraw3",
            ),
            (
                ExchangeAction::UsdClassTransfer(UsdClassTransferAction {
                    amount: "1".to_string(),
                    to_perp: true,
                    nonce: 1,
                }),
                "usdClassTransfer",
            ),
            (
                ExchangeAction::SubAccountTransfer(SubAccountTransferAction {
                    sub_account_user: "0xabc".to_string(),
                    is_deposit: true,
                    usd: 1_000_000,
                }),
                "subAccountTransfer",
            ),
            (
                ExchangeAction::UpdateLeverage(UpdateLeverageAction {
                    asset: 0,
                    is_cross: true,
                    leverage: 10,
                }),
                "updateLeverage",
            ),
        ];

        for (action, tag) in cases {
            assert_eq!(action.action_type(), tag);
            let value = serde_json::to_value(&action).unwrap();
            assert_eq!(value["type"], tag);
        }
    }

    #[test]
    fn test_send_asset_serialization() {
        let action = ExchangeAction::SendAsset(SendAssetAction {
            destination: "0x1234567890123456789012345678901234567890".to_string(),
            source_dex: String::new(),
            destination_dex: "spot".to_string(),
            token: "USDC".to_string(),
            amount: "50".to_string(),
            from_sub_account: String::new(),
            nonce: 1583838,
        });

        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(
            json,
            r#"{"type":"sendAsset","destination":"0x1234567890123456789012345678901234567890","sourceDex":"","destinationDex":"spot","token":"USDC","amount":"50","fromSubAccount":"","nonce":1583838}"#
        );
    }

    #[test]
    fn test_action_round_trips_through_json() {
        let action = ExchangeAction::UpdateLeverage(UpdateLeverageAction {
            asset: 3,
            is_cross: false,
            leverage: 5,
        });
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(
            json,
            r#"{"type":"updateLeverage","asset":3,"isCross":false,"leverage":5}"#
        );
        let parsed: ExchangeAction = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, action);
    }
}
