use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::asset::{AssetClass, Holding};
use crate::models::price::PriceQuote;
use super::traits::PriceProvider;

/// Returns the value typed into the sheet's `Manual_Current_Value` column.
/// The quote covers the whole position, in the holding's currency.
#[derive(Debug, Default)]
pub struct ManualProvider;

impl ManualProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PriceProvider for ManualProvider {
    fn name(&self) -> &str {
        "Manual"
    }

    fn supported_asset_classes(&self) -> Vec<AssetClass> {
        vec![AssetClass::Manual]
    }

    fn is_remote(&self) -> bool {
        false
    }

    async fn get_quote(&self, holding: &Holding, as_of: NaiveDate) -> Result<PriceQuote, CoreError> {
        let value = holding
            .manual_value
            .filter(|v| *v > 0.0)
            .ok_or_else(|| CoreError::PriceNotAvailable {
                symbol: holding.ticker.clone(),
                date: as_of.to_string(),
            })?;
        Ok(PriceQuote::position(
            holding.ticker.clone(),
            value,
            holding.currency.clone(),
            as_of,
        ))
    }
}
