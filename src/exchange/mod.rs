//! Exchange endpoint: authenticated actions
//!
//! Every action follows the same pipeline: encode, hash, sign, submit,
//! validate. [`actions`] holds the wire shapes, [`request`] the signing and
//! transport, [`response`] the interpretation of what comes back.

pub mod actions;
pub mod leverage;
pub mod orders;
pub mod request;
pub mod response;
pub mod transfer;

pub use actions::{BuilderFee, ExchangeAction};
pub use orders::{encode_order, encode_order_batch};
pub use request::{RawResponse, SignedRequest, SubmitOptions};
pub use response::{
    validate, validate_order_response, ExchangeResponseData, FilledOrder, OrderOutcome,
    RestingOrder,
};
pub use transfer::AssetTransfer;
