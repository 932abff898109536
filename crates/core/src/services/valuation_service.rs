use chrono::NaiveDate;
use tracing::warn;

use crate::errors::CoreError;
use crate::models::analytics::Valuation;
use crate::models::asset::Holding;
use super::currency_service::CurrencyService;
use super::price_service::PriceService;

/// Resolves a holding's current value and cost basis in the base currency.
///
/// - Priced holdings: value = quote × quantity, cost = quantity × purchase
///   price, both converted from the holding's currency.
/// - Manual holdings: value = the manual value (converted), cost = the manual
///   total cost, which the sheet already states in the base currency.
///
/// Failures never propagate: they become [`Valuation::Unavailable`].
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    pub async fn value_holding(
        &self,
        price_service: &PriceService,
        currency_service: &mut CurrencyService,
        holding: &Holding,
        as_of: NaiveDate,
    ) -> Valuation {
        let cost_basis = self
            .cost_basis(price_service, currency_service, holding)
            .await;

        let current_value = self
            .current_value(price_service, currency_service, holding, as_of)
            .await;

        match (current_value, cost_basis) {
            (Ok(current_value), Ok(cost_basis)) => Valuation::Available {
                current_value,
                cost_basis,
            },
            (Err(e), cost_basis) => {
                warn!(ticker = %holding.ticker, error = %e, "holding could not be valued");
                Valuation::Unavailable {
                    reason: e.to_string(),
                    cost_basis: cost_basis.ok(),
                }
            }
            (Ok(_), Err(e)) => {
                warn!(ticker = %holding.ticker, error = %e, "cost basis could not be converted");
                Valuation::unavailable(e.to_string())
            }
        }
    }

    /// Cost basis in the base currency.
    pub async fn cost_basis(
        &self,
        price_service: &PriceService,
        currency_service: &mut CurrencyService,
        holding: &Holding,
    ) -> Result<f64, CoreError> {
        if holding.is_manual() {
            return Ok(holding.manual_total_cost);
        }
        let cost = holding.quantity * holding.purchase_price;
        if cost == 0.0 {
            return Ok(0.0);
        }
        currency_service
            .to_base(price_service, cost, &holding.currency)
            .await
    }

    async fn current_value(
        &self,
        price_service: &PriceService,
        currency_service: &mut CurrencyService,
        holding: &Holding,
        as_of: NaiveDate,
    ) -> Result<f64, CoreError> {
        let quote = price_service.get_quote(holding, as_of).await?;
        let value = quote.value_of(holding.quantity);
        currency_service
            .to_base(price_service, value, &quote.currency)
            .await
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
