//! Signed request assembly and submission
//!
//! An action moves through encode, hash and sign before any byte reaches the
//! network. A failure at any stage stops the pipeline there.

use ethers::types::Address;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{Signature, Wallet};
use crate::client::{Client, Network};
use crate::error::{Error, Result};
use crate::exchange::actions::ExchangeAction;
use crate::exchange::response::{validate, ExchangeResponseData};
use crate::hash;

/// Per-submission options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitOptions {
    /// Use this nonce instead of the client's next one
    pub nonce: Option<u64>,
    /// Act on behalf of a vault or subaccount
    pub vault_address: Option<Address>,
    /// Venue drops the action after this millisecond timestamp
    pub expires_after: Option<u64>,
}

impl SubmitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn vault_address(mut self, vault_address: Address) -> Self {
        self.vault_address = Some(vault_address);
        self
    }

    pub fn expires_after(mut self, expires_after: u64) -> Self {
        self.expires_after = Some(expires_after);
        self
    }
}

/// Body POSTed to the exchange endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedRequest {
    pub action: ExchangeAction,
    pub nonce: u64,
    pub signature: Signature,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_after: Option<u64>,
}

impl SignedRequest {
    /// Hash and sign an action
    pub async fn sign(
        action: ExchangeAction,
        nonce: u64,
        vault_address: Option<Address>,
        expires_after: Option<u64>,
        wallet: &Wallet,
        network: Network,
    ) -> Result<Self> {
        let connection_id = hash::connection_id(&action, nonce, vault_address, expires_after)?;
        debug!(
            action = action.action_type(),
            nonce,
            connection_id = %hex::encode(connection_id),
            "hashed action"
        );

        let signature = wallet.sign_connection_id(connection_id, network).await?;
        debug!(action = action.action_type(), nonce, "signed action");

        Ok(Self {
            action,
            nonce,
            signature,
            vault_address,
            expires_after,
        })
    }
}

/// Transport-level response, before interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl Client {
    /// Pick the nonce for a submission, keeping generated nonces above any
    /// caller-supplied one
    pub(crate) fn nonce_for(&self, options: &SubmitOptions) -> Result<u64> {
        match options.nonce {
            Some(nonce) => {
                self.observe_nonce(nonce);
                Ok(nonce)
            }
            None => self.next_nonce(),
        }
    }

    /// Sign an action without sending it
    pub async fn sign_action(
        &self,
        wallet: &Wallet,
        action: ExchangeAction,
        options: SubmitOptions,
    ) -> Result<SignedRequest> {
        ensure_can_sign(wallet)?;

        let nonce = self.nonce_for(&options)?;
        debug!(action = action.action_type(), nonce, "built action");

        SignedRequest::sign(
            action,
            nonce,
            options.vault_address,
            options.expires_after,
            wallet,
            self.network(),
        )
        .await
    }

    /// POST a signed request to the exchange endpoint
    pub async fn post_exchange(&self, request: &SignedRequest) -> Result<RawResponse> {
        let url = self.exchange_url();
        let response = self
            .http()
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(Error::Http)?;
        debug!(
            action = request.action.action_type(),
            nonce = request.nonce,
            status,
            "submitted action"
        );

        Ok(RawResponse { status, body })
    }

    /// Send a signed request and validate the response
    pub async fn submit(&self, request: &SignedRequest) -> Result<ExchangeResponseData> {
        let raw = self.post_exchange(request).await?;
        validate(&raw)
    }

    /// Sign, send and validate an action
    pub async fn execute(
        &self,
        wallet: &Wallet,
        action: ExchangeAction,
        options: SubmitOptions,
    ) -> Result<ExchangeResponseData> {
        let request = self.sign_action(wallet, action, options).await?;
        self.submit(&request).await
    }
}

pub(crate) fn ensure_can_sign(wallet: &Wallet) -> Result<()> {
    if wallet.can_sign() {
        Ok(())
    } else {
        Err(Error::SigningUnavailable(format!(
            "wallet {:?} is watch-only",
            wallet.address()
        )))
    }
}
