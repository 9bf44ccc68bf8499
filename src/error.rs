//! Error types for the action pipeline
//!
//! Every stage of a submission reports failures through [`Error`]. Use
//! [`Error::kind`] to tell pre-flight failures (nothing was sent) apart from
//! failures that happened after the request reached the venue.

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected before any network call
    Validation,
    /// Symbol absent from the cached asset universe
    UnknownAsset,
    /// Local signer or encoder misbehaved
    Signing,
    /// HTTP failure or unparsable response
    Transport,
    /// The venue rejected the action or some of its orders
    Api,
}

/// Errors that can occur while building, signing or submitting an action
#[derive(Error, Debug)]
pub enum Error {
    /// An order batch must contain at least one order
    #[error("Order batch cannot be empty")]
    EmptyOrderBatch,

    /// NaN or infinite numeric input
    #[error("Non-finite numeric value: {0}")]
    NonFiniteValue(f64),

    /// Invalid parameter error
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Symbol could not be resolved to an asset index
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    /// The wallet cannot produce typed-data signatures
    #[error("Signing unavailable: {0}")]
    SigningUnavailable(String),

    /// The signing capability returned something that is not an (r, s, v) signature
    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    /// Key material error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Canonical action encoding failed
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status or a response body of unexpected shape
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The venue rejected the action
    #[error("API error: {message}")]
    Api {
        message: String,
        raw: serde_json::Value,
    },
}

impl Error {
    /// Classify the error by pipeline stage
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyOrderBatch
            | Error::NonFiniteValue(_)
            | Error::InvalidParameter(_)
            | Error::SigningUnavailable(_) => ErrorKind::Validation,
            Error::UnknownAsset(_) => ErrorKind::UnknownAsset,
            Error::MalformedSignature(_) | Error::Auth(_) | Error::Encoding(_) => {
                ErrorKind::Signing
            }
            Error::Http(_) | Error::Transport(_) | Error::Json(_) => ErrorKind::Transport,
            Error::Api { .. } => ErrorKind::Api,
        }
    }

    /// True when the failure happened before the action was sent to the venue
    pub fn is_pre_flight(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Validation | ErrorKind::UnknownAsset | ErrorKind::Signing
        )
    }

    /// True when resubmitting with a fresh nonce is reasonable
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Raw venue response attached to an API rejection
    pub fn raw_response(&self) -> Option<&serde_json::Value> {
        match self {
            Error::Api { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
