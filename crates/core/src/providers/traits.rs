use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::asset::{AssetClass, Holding};
use crate::models::price::PriceQuote;

/// Capability shared by every valuation source.
///
/// Each asset class (Yahoo-priced markets, TEFAS funds, time deposits,
/// manual entries) is served by an implementation of this trait and found
/// through the registry, so adding a source touches no other code.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Which asset classes this provider can value.
    fn supported_asset_classes(&self) -> Vec<AssetClass>;

    /// Whether a quote needs a network round trip (used for request pacing).
    fn is_remote(&self) -> bool {
        true
    }

    /// Current price (or position value) for `holding` as of `as_of`.
    async fn get_quote(&self, holding: &Holding, as_of: NaiveDate) -> Result<PriceQuote, CoreError>;
}

/// Source of spot exchange rates used to bring values into the base currency.
#[async_trait]
pub trait FxRateProvider: Send + Sync {
    fn name(&self) -> &str;

    /// How many units of `to` one unit of `from` buys.
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64, CoreError>;
}
