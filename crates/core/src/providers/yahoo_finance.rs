use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::asset::{AssetClass, Holding};
use crate::models::price::PriceQuote;
use super::traits::{FxRateProvider, PriceProvider};

/// Yahoo Finance provider for US stocks, crypto pairs and currency pairs.
///
/// - **Free**: No API key required.
/// - **Tickers**: `AAPL`, `BTC-USD`, `USDTRY=X`, whatever Yahoo lists.
/// - **Data**: latest daily close.
///
/// The quote is taken to be in the currency the holdings sheet states for
/// the row; conversion to the base currency is done by the currency service.
/// Exchange rates use Yahoo's `{FROM}{TO}=X` pair convention.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to create connector: {e}"),
            })?;
        Ok(Self { connector })
    }

    /// Yahoo's ticker for the `from`→`to` exchange rate.
    pub fn fx_symbol(from: &str, to: &str) -> String {
        format!("{}{}=X", from.trim().to_uppercase(), to.trim().to_uppercase())
    }

    /// Convert a unix timestamp (seconds) to `chrono::NaiveDate`.
    fn timestamp_to_naive_date(ts: i64) -> Option<NaiveDate> {
        chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
    }

    /// Latest daily close for `symbol`, with the date it was observed.
    async fn latest_close(&self, symbol: &str) -> Result<(f64, Option<NaiveDate>), CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to fetch latest quote for {symbol}: {e}"),
            })?;

        let quote = resp.last_quote().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("No quote data for {symbol}: {e}"),
        })?;

        Ok((quote.close, Self::timestamp_to_naive_date(quote.timestamp as i64)))
    }
}

#[async_trait]
impl PriceProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    fn supported_asset_classes(&self) -> Vec<AssetClass> {
        vec![AssetClass::UsStock, AssetClass::Crypto, AssetClass::Fx]
    }

    async fn get_quote(&self, holding: &Holding, as_of: NaiveDate) -> Result<PriceQuote, CoreError> {
        let (close, observed) = self.latest_close(&holding.ticker).await?;
        Ok(PriceQuote::per_unit(
            holding.ticker.clone(),
            close,
            holding.currency.clone(),
            observed.unwrap_or(as_of),
        ))
    }
}

#[async_trait]
impl FxRateProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn get_rate(&self, from: &str, to: &str) -> Result<f64, CoreError> {
        if from.eq_ignore_ascii_case(to) {
            return Ok(1.0);
        }
        let symbol = Self::fx_symbol(from, to);
        let (rate, _) = self.latest_close(&symbol).await?;
        Ok(rate)
    }
}
