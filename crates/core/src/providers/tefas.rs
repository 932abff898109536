use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use reqwest::Client;
use serde::Deserialize;

use crate::errors::CoreError;
use crate::models::asset::{AssetClass, Holding};
use crate::models::price::PriceQuote;
use super::traits::PriceProvider;

const BASE_URL: &str = "https://www.tefas.gov.tr/api/DB";

/// Fund categories queried in order: mutual funds, then pension funds.
const FUND_TYPES: [&str; 2] = ["YAT", "EMK"];

/// TEFAS provider for Turkish mutual fund prices.
///
/// - **Free**: No API key, public history endpoint used by the TEFAS site.
/// - **Data**: one NAV per fund per business day, published after close.
///
/// Today's price is not published until the evening, so the provider asks
/// for the window `[as_of − lookback, as_of − 1]` and takes the latest
/// positive price in it. Weekends and holidays are covered by the window.
///
/// A fund missing from the mutual fund list costs a second POST for the
/// pension list; that request waits `request_delay` like any other call.
pub struct TefasProvider {
    client: Client,
    lookback_days: u32,
    request_delay: std::time::Duration,
}

impl TefasProvider {
    pub fn new(lookback_days: u32, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent("Mozilla/5.0 (compatible; investment-tracker)")
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            lookback_days: lookback_days.max(1),
            request_delay: std::time::Duration::ZERO,
        }
    }

    /// Space the per-fund-type requests of one quote `delay` apart.
    pub fn with_request_delay(mut self, delay: std::time::Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Wait before the `attempt`-th fund-type request (0-based) of a quote.
    pub fn delay_before_attempt(&self, attempt: usize) -> std::time::Duration {
        if attempt == 0 {
            std::time::Duration::ZERO
        } else {
            self.request_delay
        }
    }

    /// Date window searched for a price on `as_of`.
    pub fn search_window(&self, as_of: NaiveDate) -> (NaiveDate, NaiveDate) {
        let end = as_of - Duration::days(1);
        let start = as_of - Duration::days(i64::from(self.lookback_days));
        (start, end)
    }

    async fn fetch_history(
        &self,
        code: &str,
        fund_type: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HistoryRow>, CoreError> {
        let start_str = start.format("%d.%m.%Y").to_string();
        let end_str = end.format("%d.%m.%Y").to_string();
        let form = [
            ("fontip", fund_type),
            ("sfontur", ""),
            ("fonkod", code),
            ("fongrup", ""),
            ("bastarih", start_str.as_str()),
            ("bittarih", end_str.as_str()),
            ("fonturkod", ""),
            ("fonunvantip", ""),
        ];

        let resp: HistoryResponse = self
            .client
            .post(format!("{BASE_URL}/BindHistoryInfo"))
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "TEFAS".into(),
                message: format!("Failed to parse history for {code}: {e}"),
            })?;

        Ok(resp.data)
    }
}

// ── TEFAS API response types ────────────────────────────────────────

#[derive(Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    data: Vec<HistoryRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryRow {
    /// Epoch milliseconds; sent as a string
    #[serde(rename = "TARIH")]
    pub date: EpochMillis,
    #[serde(rename = "FIYAT")]
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EpochMillis {
    Text(String),
    Number(i64),
}

impl EpochMillis {
    pub fn to_date(&self) -> Option<NaiveDate> {
        let millis = match self {
            EpochMillis::Text(s) => s.trim().parse::<i64>().ok()?,
            EpochMillis::Number(n) => *n,
        };
        chrono::DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
    }
}

/// Pick the most recent row with a usable price.
pub fn latest_price(rows: &[HistoryRow]) -> Option<(NaiveDate, f64)> {
    rows.iter()
        .filter(|r| r.price.is_finite() && r.price > 0.0)
        .filter_map(|r| r.date.to_date().map(|d| (d, r.price)))
        .max_by_key(|(d, _)| *d)
}

#[async_trait]
impl PriceProvider for TefasProvider {
    fn name(&self) -> &str {
        "TEFAS"
    }

    fn supported_asset_classes(&self) -> Vec<AssetClass> {
        vec![AssetClass::Fund]
    }

    async fn get_quote(&self, holding: &Holding, as_of: NaiveDate) -> Result<PriceQuote, CoreError> {
        let code = holding.ticker.as_str();
        let (start, end) = self.search_window(as_of);

        let mut last_error = None;
        for (attempt, fund_type) in FUND_TYPES.into_iter().enumerate() {
            let delay = self.delay_before_attempt(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match self.fetch_history(code, fund_type, start, end).await {
                Ok(rows) => {
                    if let Some((date, price)) = latest_price(&rows) {
                        return Ok(PriceQuote::per_unit(code, price, holding.currency.clone(), date));
                    }
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::PriceNotAvailable {
            symbol: code.to_string(),
            date: format!("{start}..{end}"),
        }))
    }
}
