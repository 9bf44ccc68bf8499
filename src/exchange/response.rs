//! Exchange response interpretation
//!
//! Responses are parsed into explicit envelopes. Anything that does not fit
//! one of them is a transport error, not a silent success.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::exchange::request::RawResponse;
use crate::types::Cloid;

/// Order accepted onto the book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestingOrder {
    pub oid: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloid: Option<Cloid>,
}

/// Order filled on submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledOrder {
    pub total_sz: String,
    pub avg_px: String,
    pub oid: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloid: Option<Cloid>,
}

/// Outcome of one submitted order, positionally aligned with the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderOutcome {
    Resting(RestingOrder),
    Filled(FilledOrder),
    Error(String),
    /// Trigger order accepted and parked until its trigger price is hit
    #[serde(rename = "waitingForTrigger")]
    WaitingForTrigger,
    /// Triggered order accepted and waiting to fill
    #[serde(rename = "waitingForFill")]
    WaitingForFill,
}

impl OrderOutcome {
    /// Accepted by the venue in any form
    pub fn is_success(&self) -> bool {
        !matches!(self, OrderOutcome::Error(_))
    }

    /// Venue-assigned order id of a successful order
    pub fn order_id(&self) -> Option<u64> {
        match self {
            OrderOutcome::Resting(resting) => Some(resting.oid),
            OrderOutcome::Filled(filled) => Some(filled.oid),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            OrderOutcome::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatuses {
    pub statuses: Vec<OrderOutcome>,
}

/// Payload of a successful `{"status":"ok"}` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ExchangeResponseData {
    Order(OrderStatuses),
    Default,
}

/// Interpret a raw exchange response
pub fn validate(raw: &RawResponse) -> Result<ExchangeResponseData> {
    if !raw.is_success() {
        return Err(Error::Transport(format!("HTTP {} - {}", raw.status, raw.body)));
    }

    let value: Value = serde_json::from_str(&raw.body)
        .map_err(|e| Error::Transport(format!("unparsable response body: {e}")))?;
    validate_value(value)
}

/// Interpret an already-parsed response body
pub fn validate_value(value: Value) -> Result<ExchangeResponseData> {
    if !value.is_object() {
        return Err(Error::Transport(format!(
            "unrecognized response shape: {value}"
        )));
    }

    if value.get("status").and_then(Value::as_str) != Some("ok") {
        let message = match value.get("response") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => format!("status {}", value.get("status").unwrap_or(&Value::Null)),
        };
        warn!(%message, "action rejected");
        return Err(Error::Api {
            message,
            raw: value,
        });
    }

    let data = value
        .get("response")
        .cloned()
        .ok_or_else(|| Error::Transport("response field missing".to_string()))
        .and_then(|response| {
            serde_json::from_value::<ExchangeResponseData>(response)
                .map_err(|e| Error::Transport(format!("unrecognized response shape: {e}")))
        })?;

    if let ExchangeResponseData::Order(order) = &data {
        let errors: Vec<&str> = order
            .statuses
            .iter()
            .filter_map(OrderOutcome::error_message)
            .collect();
        if !errors.is_empty() {
            let message = errors.join(", ");
            warn!(%message, rejected = errors.len(), "orders rejected");
            return Err(Error::Api {
                message,
                raw: value,
            });
        }
    }

    Ok(data)
}

/// Validate a response to an order batch of `expected` orders
pub fn validate_order_response(raw: &RawResponse, expected: usize) -> Result<Vec<OrderOutcome>> {
    match validate(raw)? {
        ExchangeResponseData::Order(order) if order.statuses.len() == expected => {
            Ok(order.statuses)
        }
        ExchangeResponseData::Order(order) => Err(Error::Transport(format!(
            "expected {expected} order statuses, got {}",
            order.statuses.len()
        ))),
        ExchangeResponseData::Default => Err(Error::Transport(
            "expected order statuses, got default response".to_string(),
        )),
    }
}

/// Validate a response to a non-order action
pub fn validate_default_response(raw: &RawResponse) -> Result<()> {
    match validate(raw)? {
        ExchangeResponseData::Default => Ok(()),
        ExchangeResponseData::Order(_) => Err(Error::Transport(
            "unexpected order statuses in response".to_string(),
        )),
    }
}
