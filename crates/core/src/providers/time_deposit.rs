use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::asset::{AssetClass, Holding};
use crate::models::price::PriceQuote;
use super::traits::PriceProvider;

/// Values bank time deposits with simple (non-compounding) daily interest.
///
/// The holding's quantity is the principal, so the quote is the accrual
/// factor `1 + rate / 365 / 100 × days` and value = principal × factor.
/// A deposit whose start date is still in the future is worth its principal.
#[derive(Debug, Default)]
pub struct TimeDepositProvider;

impl TimeDepositProvider {
    pub fn new() -> Self {
        Self
    }

    /// Growth of one unit of principal from `start` to `as_of`.
    pub fn accrual_factor(annual_rate_pct: f64, start: NaiveDate, as_of: NaiveDate) -> f64 {
        if start > as_of {
            return 1.0;
        }
        let days = (as_of - start).num_days() as f64;
        1.0 + annual_rate_pct / 365.0 / 100.0 * days
    }
}

#[async_trait]
impl PriceProvider for TimeDepositProvider {
    fn name(&self) -> &str {
        "Time Deposit"
    }

    fn supported_asset_classes(&self) -> Vec<AssetClass> {
        vec![AssetClass::TimeDeposit]
    }

    fn is_remote(&self) -> bool {
        false
    }

    async fn get_quote(&self, holding: &Holding, as_of: NaiveDate) -> Result<PriceQuote, CoreError> {
        let start = holding.start_date.ok_or_else(|| CoreError::Api {
            provider: "Time Deposit".into(),
            message: format!("{} has no Start_Date", holding.ticker),
        })?;
        if !holding.annual_interest_rate.is_finite() || holding.annual_interest_rate < 0.0 {
            return Err(CoreError::Api {
                provider: "Time Deposit".into(),
                message: format!(
                    "{} has an invalid interest rate: {}",
                    holding.ticker, holding.annual_interest_rate
                ),
            });
        }

        let factor = Self::accrual_factor(holding.annual_interest_rate, start, as_of);
        Ok(PriceQuote::per_unit(
            holding.ticker.clone(),
            factor,
            holding.currency.clone(),
            as_of,
        ))
    }
}
