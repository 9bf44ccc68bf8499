//! Fund movement actions
//!
//! Withdrawals, spot/perp class transfers, subaccount transfers and asset
//! sends. Several of these embed the nonce in the action itself, so the nonce
//! is chosen before the action is built and reused for signing.

use ethers::types::Address;

use crate::auth::Wallet;
use crate::client::Client;
use crate::decimal::DecimalValue;
use crate::error::{Error, Result};
use crate::exchange::actions::{
    ExchangeAction, SendAssetAction, SubAccountTransferAction, UsdClassTransferAction,
    WithdrawAction,
};
use crate::exchange::request::{ensure_can_sign, SubmitOptions};
use crate::exchange::response::validate_default_response;

/// Parameters of a `sendAsset` action
#[derive(Debug, Clone, PartialEq)]
pub struct AssetTransfer {
    pub destination: Address,
    /// Dex the funds leave; empty for the default perp dex
    pub source_dex: String,
    /// Dex the funds arrive at; `"spot"` for the spot balance
    pub destination_dex: String,
    /// Token identifier, e.g. `"USDC"` or `"PURR:0xc4bf3f870c0e9465323c0b6ed28096c2"`
    pub token: String,
    pub amount: DecimalValue,
    pub from_sub_account: Option<Address>,
}

impl AssetTransfer {
    pub fn new(
        destination: Address,
        token: impl Into<String>,
        amount: impl Into<DecimalValue>,
    ) -> Self {
        Self {
            destination,
            source_dex: String::new(),
            destination_dex: String::new(),
            token: token.into(),
            amount: amount.into(),
            from_sub_account: None,
        }
    }

    pub fn from_dex(mut self, dex: impl Into<String>) -> Self {
        self.source_dex = dex.into();
        self
    }

    pub fn to_dex(mut self, dex: impl Into<String>) -> Self {
        self.destination_dex = dex.into();
        self
    }

    pub fn from_sub_account(mut self, sub_account: Address) -> Self {
        self.from_sub_account = Some(sub_account);
        self
    }
}

/// Render an amount and reject empty or negative values
fn amount_to_wire(amount: &DecimalValue) -> Result<String> {
    let wire = amount.to_wire()?;
    let wire = wire.trim();
    if wire.is_empty() {
        return Err(Error::InvalidParameter("Amount cannot be empty".to_string()));
    }
    if wire.starts_with('-') {
        return Err(Error::InvalidParameter(format!(
            "Amount must not be negative: {wire}"
        )));
    }
    Ok(wire.to_string())
}

fn address_to_wire(address: Address) -> String {
    format!("{address:?}")
}

impl Client {
    /// Withdraw USDC to an address on the settlement chain
    ///
    /// # Example
    /// ```ignore
    /// let destination = "0x1234567890123456789012345678901234567890".parse()?;
    /// client.withdraw(&wallet, destination, "100.5", SubmitOptions::new()).await?;
    /// ```
    pub async fn withdraw(
        &self,
        wallet: &Wallet,
        destination: Address,
        amount: impl Into<DecimalValue>,
        options: SubmitOptions,
    ) -> Result<()> {
        ensure_can_sign(wallet)?;
        let amount = amount_to_wire(&amount.into())?;
        let nonce = self.nonce_for(&options)?;

        let action = ExchangeAction::Withdraw(WithdrawAction {
            destination: address_to_wire(destination),
            amount,
            time: nonce,
        });
        self.execute_default(wallet, action, options.nonce(nonce))
            .await
    }

    /// Move USDC between the spot and perp balances
    pub async fn usd_class_transfer(
        &self,
        wallet: &Wallet,
        amount: impl Into<DecimalValue>,
        to_perp: bool,
        options: SubmitOptions,
    ) -> Result<()> {
        ensure_can_sign(wallet)?;
        let amount = amount_to_wire(&amount.into())?;
        let nonce = self.nonce_for(&options)?;

        let action = ExchangeAction::UsdClassTransfer(UsdClassTransferAction {
            amount,
            to_perp,
            nonce,
        });
        self.execute_default(wallet, action, options.nonce(nonce))
            .await
    }

    /// Move USDC between the master account and a subaccount
    ///
    /// `usd` is in micro-USD: 1_000_000 is one dollar.
    pub async fn sub_account_transfer(
        &self,
        wallet: &Wallet,
        sub_account: Address,
        is_deposit: bool,
        usd: u64,
        options: SubmitOptions,
    ) -> Result<()> {
        ensure_can_sign(wallet)?;
        if usd == 0 {
            return Err(Error::InvalidParameter(
                "Transfer amount must be positive".to_string(),
            ));
        }

        let action = ExchangeAction::SubAccountTransfer(SubAccountTransferAction {
            sub_account_user: address_to_wire(sub_account),
            is_deposit,
            usd,
        });
        self.execute_default(wallet, action, options).await
    }

    /// Send a token to another address or between dexes
    pub async fn send_asset(
        &self,
        wallet: &Wallet,
        transfer: AssetTransfer,
        options: SubmitOptions,
    ) -> Result<()> {
        ensure_can_sign(wallet)?;
        if transfer.token.trim().is_empty() {
            return Err(Error::InvalidParameter("Token cannot be empty".to_string()));
        }
        let amount = amount_to_wire(&transfer.amount)?;
        let nonce = self.nonce_for(&options)?;

        let action = ExchangeAction::SendAsset(SendAssetAction {
            destination: address_to_wire(transfer.destination),
            source_dex: transfer.source_dex,
            destination_dex: transfer.destination_dex,
            token: transfer.token,
            amount,
            from_sub_account: transfer
                .from_sub_account
                .map(address_to_wire)
                .unwrap_or_default(),
            nonce,
        });
        self.execute_default(wallet, action, options.nonce(nonce))
            .await
    }

    /// Sign and submit an action whose success response carries no data
    pub(crate) async fn execute_default(
        &self,
        wallet: &Wallet,
        action: ExchangeAction,
        options: SubmitOptions,
    ) -> Result<()> {
        let request = self.sign_action(wallet, action, options).await?;
        let raw = self.post_exchange(&request).await?;
        validate_default_response(&raw)
    }
}
