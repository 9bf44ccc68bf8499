//! Leverage updates for perpetual positions

use tracing::debug;

use crate::auth::Wallet;
use crate::client::Client;
use crate::error::{Error, Result};
use crate::exchange::actions::{ExchangeAction, UpdateLeverageAction};
use crate::exchange::request::{ensure_can_sign, SubmitOptions};
use crate::types::MarketKind;

impl Client {
    /// Update leverage for a perpetual asset
    ///
    /// Sets the leverage for a perpetual asset. The leverage mode can be either
    /// cross margin (shared margin across positions) or isolated margin
    /// (separate margin per position).
    ///
    /// # Errors
    /// Returns an error if:
    /// - The leverage value is zero
    /// - The symbol is not in the perp universe
    /// - The wallet signing fails
    /// - The API returns an error
    ///
    /// # Example
    /// ```ignore
    /// // 10x cross margin on BTC
    /// client.update_leverage(&wallet, "BTC", true, 10, SubmitOptions::new()).await?;
    /// ```
    pub async fn update_leverage(
        &self,
        wallet: &Wallet,
        symbol: &str,
        is_cross: bool,
        leverage: u32,
        options: SubmitOptions,
    ) -> Result<()> {
        ensure_can_sign(wallet)?;
        if leverage == 0 {
            return Err(Error::InvalidParameter(
                "Leverage must be greater than 0".to_string(),
            ));
        }

        let asset = self.resolve_asset(symbol, MarketKind::Perp).await?;
        debug!(symbol, asset, is_cross, leverage, "updating leverage");

        let action = ExchangeAction::UpdateLeverage(UpdateLeverageAction {
            asset,
            is_cross,
            leverage,
        });
        self.execute_default(wallet, action, options).await
    }
}
