use chrono::NaiveDate;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::asset::Holding;
use crate::models::price::PriceQuote;
use crate::providers::registry::PriceProviderRegistry;

/// Fetches quotes and exchange rates from the registered providers.
///
/// - Providers for a class are tried in registration order; the first valid
///   answer wins, failures fall through to the next one.
/// - A price must be finite and strictly positive to be accepted.
/// - Remote calls are spaced at least `request_delay` apart. Calls are made
///   one at a time; nothing here runs concurrently.
pub struct PriceService {
    registry: PriceProviderRegistry,
    request_delay: Duration,
    last_remote_call: Mutex<Option<Instant>>,
}

impl PriceService {
    pub fn new(registry: PriceProviderRegistry) -> Self {
        Self::with_request_delay(registry, Duration::ZERO)
    }

    pub fn with_request_delay(registry: PriceProviderRegistry, request_delay: Duration) -> Self {
        Self {
            registry,
            request_delay,
            last_remote_call: Mutex::new(None),
        }
    }

    /// Quote a holding with automatic provider fallback. Manually valued
    /// rows go to the manual provider whatever their sheet class.
    pub async fn get_quote(&self, holding: &Holding, as_of: NaiveDate) -> Result<PriceQuote, CoreError> {
        let class = holding.pricing_class();
        let providers = self.registry.get_providers_for(&class);
        if providers.is_empty() {
            return Err(CoreError::NoProvider(class.to_string()));
        }

        let mut last_error = None;
        for provider in &providers {
            if provider.is_remote() {
                self.pace().await;
            }
            match provider.get_quote(holding, as_of).await {
                Ok(quote) => {
                    if !quote.price.is_finite() || quote.price <= 0.0 {
                        last_error = Some(CoreError::Api {
                            provider: provider.name().to_string(),
                            message: format!(
                                "Invalid price returned for {}: {} (must be finite and positive)",
                                holding.ticker, quote.price
                            ),
                        });
                        continue;
                    }
                    debug!(
                        ticker = %holding.ticker,
                        provider = provider.name(),
                        price = quote.price,
                        currency = %quote.currency,
                        "quote received"
                    );
                    return Ok(quote);
                }
                Err(e) => {
                    warn!(ticker = %holding.ticker, provider = provider.name(), error = %e, "provider failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(class.to_string())))
    }

    /// Exchange rate `from` → `to` with fallback across FX sources.
    pub async fn get_fx_rate(&self, from: &str, to: &str) -> Result<f64, CoreError> {
        if from.eq_ignore_ascii_case(to) {
            return Ok(1.0);
        }

        let providers = self.registry.fx_providers();
        if providers.is_empty() {
            return Err(CoreError::NoProvider(format!("FX {from}/{to}")));
        }

        let mut last_error = None;
        for provider in &providers {
            self.pace().await;
            match provider.get_rate(from, to).await {
                Ok(rate) if rate.is_finite() && rate > 0.0 => return Ok(rate),
                Ok(rate) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!("Invalid rate returned for {from}/{to}: {rate}"),
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(format!("FX {from}/{to}"))))
    }

    /// Sleep until `request_delay` has passed since the previous remote call.
    async fn pace(&self) {
        if self.request_delay.is_zero() {
            return;
        }
        let wait = {
            let last = self.last_remote_call.lock().unwrap_or_else(|e| e.into_inner());
            last.map(|at| self.request_delay.saturating_sub(at.elapsed()))
        };
        if let Some(wait) = wait.filter(|w| !w.is_zero()) {
            tokio::time::sleep(wait).await;
        }
        let mut last = self.last_remote_call.lock().unwrap_or_else(|e| e.into_inner());
        *last = Some(Instant::now());
    }
}
