use std::collections::HashMap;

use tracing::{info, warn};

use crate::errors::CoreError;
use crate::models::price::FxRateCache;
use super::price_service::PriceService;

/// Converts amounts into the base currency.
///
/// Rates are fetched at most once per currency per run: successes are kept
/// in an [`FxRateCache`], failures are remembered too so a dead FX source
/// costs one request, not one per holding.
pub struct CurrencyService {
    base_currency: String,
    cache: FxRateCache,
    failures: HashMap<String, String>,
}

impl CurrencyService {
    pub fn new(base_currency: &str) -> Self {
        Self {
            base_currency: base_currency.trim().to_uppercase(),
            cache: FxRateCache::new(),
            failures: HashMap::new(),
        }
    }

    /// Units of base currency per unit of `currency`.
    pub async fn rate_to_base(
        &mut self,
        price_service: &PriceService,
        currency: &str,
    ) -> Result<f64, CoreError> {
        let from = currency.trim().to_uppercase();
        if from.is_empty() || from == self.base_currency {
            return Ok(1.0);
        }
        if let Some(rate) = self.cache.get(&from, &self.base_currency) {
            return Ok(rate);
        }
        if let Some(message) = self.failures.get(&from) {
            return Err(CoreError::Api {
                provider: "FX".into(),
                message: format!("{from}/{} unavailable: {message}", self.base_currency),
            });
        }

        match price_service.get_fx_rate(&from, &self.base_currency).await {
            Ok(rate) => {
                info!(from = %from, to = %self.base_currency, rate, "exchange rate fetched");
                self.cache.insert(&from, &self.base_currency, rate);
                Ok(rate)
            }
            Err(e) => {
                warn!(from = %from, to = %self.base_currency, error = %e, "exchange rate unavailable");
                self.failures.insert(from, e.to_string());
                Err(e)
            }
        }
    }

    /// Convert `amount` in `currency` to the base currency.
    pub async fn to_base(
        &mut self,
        price_service: &PriceService,
        amount: f64,
        currency: &str,
    ) -> Result<f64, CoreError> {
        let rate = self.rate_to_base(price_service, currency).await?;
        Ok(amount * rate)
    }
}
