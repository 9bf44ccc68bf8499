//! Order placement
//!
//! Turns [`OrderIntent`]s into a canonical order action, resolving each symbol
//! through the client's universe cache, and submits it.

use tracing::debug;

use crate::auth::Wallet;
use crate::client::Client;
use crate::error::{Error, Result};
use crate::exchange::actions::{
    BuilderFee, ExchangeAction, LimitOrderType, OrderAction, OrderTypeSpec, OrderWire,
    TriggerOrderType,
};
use crate::exchange::request::{ensure_can_sign, SubmitOptions};
use crate::exchange::response::{validate_order_response, OrderOutcome};
use crate::types::{OrderGrouping, OrderIntent};

/// Encode one order for a resolved asset index
///
/// Trigger orders carry only the trigger specification; a time in force set on
/// them is ignored. Limit orders default to good-till-cancel.
pub fn encode_order(intent: &OrderIntent, asset: u32) -> Result<OrderWire> {
    let t = match &intent.trigger {
        Some(trigger) => OrderTypeSpec::Trigger {
            trigger: TriggerOrderType {
                is_market: trigger.is_market,
                trigger_px: trigger.trigger_price.to_wire()?,
                tpsl: trigger.tpsl,
            },
        },
        None => OrderTypeSpec::Limit {
            limit: LimitOrderType {
                tif: intent.time_in_force.unwrap_or_default(),
            },
        },
    };

    Ok(OrderWire {
        a: asset,
        b: intent.side.is_buy(),
        p: intent.price.to_wire()?,
        s: intent.size.to_wire()?,
        r: intent.reduce_only,
        t,
        c: intent.cloid,
    })
}

/// Encode a batch of orders; `assets[i]` is the index resolved for `intents[i]`
pub fn encode_order_batch(
    intents: &[OrderIntent],
    assets: &[u32],
    grouping: OrderGrouping,
    builder: Option<BuilderFee>,
) -> Result<OrderAction> {
    if intents.is_empty() {
        return Err(Error::EmptyOrderBatch);
    }
    if intents.len() != assets.len() {
        return Err(Error::InvalidParameter(format!(
            "{} orders but {} asset indices",
            intents.len(),
            assets.len()
        )));
    }

    let orders = intents
        .iter()
        .zip(assets)
        .map(|(intent, asset)| encode_order(intent, *asset))
        .collect::<Result<Vec<_>>>()?;

    Ok(OrderAction {
        orders,
        grouping,
        builder,
    })
}

impl Client {
    /// Resolve and encode a batch of orders without signing it
    pub async fn build_order_action(
        &self,
        intents: &[OrderIntent],
        grouping: OrderGrouping,
        builder: Option<BuilderFee>,
    ) -> Result<ExchangeAction> {
        if intents.is_empty() {
            return Err(Error::EmptyOrderBatch);
        }

        let mut assets = Vec::with_capacity(intents.len());
        for intent in intents {
            assets.push(self.resolve_asset(&intent.symbol, intent.market).await?);
        }

        let action = encode_order_batch(intents, &assets, grouping, builder)?;
        debug!(orders = action.orders.len(), ?grouping, "encoded order batch");
        Ok(ExchangeAction::Order(action))
    }

    /// Place a single order
    ///
    /// # Example
    /// ```ignore
    /// use hyperliquid_actions::{Client, OrderIntent, Side, Wallet};
    ///
    /// let client = Client::mainnet()?;
    /// let wallet = Wallet::from_private_key("0x...")?;
    ///
    /// let order = OrderIntent::limit("BTC-USD", Side::Buy, "100000", "0.0001");
    /// let outcome = client.place_order(&wallet, order).await?;
    /// println!("order id: {:?}", outcome.order_id());
    /// ```
    pub async fn place_order(&self, wallet: &Wallet, intent: OrderIntent) -> Result<OrderOutcome> {
        let mut outcomes = self
            .place_orders(wallet, vec![intent], OrderGrouping::Na)
            .await?;
        outcomes
            .pop()
            .ok_or_else(|| Error::Transport("no order status returned".to_string()))
    }

    /// Place multiple orders in a single request
    ///
    /// Outcomes are returned in request order. If any order is rejected the
    /// whole call fails with [`Error::Api`] carrying every rejection message.
    pub async fn place_orders(
        &self,
        wallet: &Wallet,
        intents: Vec<OrderIntent>,
        grouping: OrderGrouping,
    ) -> Result<Vec<OrderOutcome>> {
        self.place_orders_with_options(wallet, intents, grouping, None, SubmitOptions::default())
            .await
    }

    /// Place multiple orders with a builder fee, vault, expiry or fixed nonce
    pub async fn place_orders_with_options(
        &self,
        wallet: &Wallet,
        intents: Vec<OrderIntent>,
        grouping: OrderGrouping,
        builder: Option<BuilderFee>,
        options: SubmitOptions,
    ) -> Result<Vec<OrderOutcome>> {
        ensure_can_sign(wallet)?;
        if intents.is_empty() {
            return Err(Error::EmptyOrderBatch);
        }

        let action = self.build_order_action(&intents, grouping, builder).await?;
        let request = self.sign_action(wallet, action, options).await?;
        let raw = self.post_exchange(&request).await?;
        validate_order_response(&raw, intents.len())
    }
}
