use std::time::Duration;
use tracing::warn;

use crate::models::asset::AssetClass;
use crate::models::settings::Settings;

use super::manual::ManualProvider;
use super::tefas::TefasProvider;
use super::time_deposit::TimeDepositProvider;
use super::traits::{FxRateProvider, PriceProvider};
use super::yahoo_finance::YahooFinanceProvider;

/// Registry of all available valuation sources.
///
/// Routes requests to the correct provider based on `AssetClass`, and holds
/// the exchange-rate sources used for base-currency conversion.
pub struct PriceProviderRegistry {
    providers: Vec<Box<dyn PriceProvider>>,
    fx_providers: Vec<Box<dyn FxRateProvider>>,
}

impl PriceProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            fx_providers: Vec::new(),
        }
    }

    /// Create a registry with all default providers pre-configured.
    pub fn new_with_defaults(settings: &Settings) -> Self {
        let mut registry = Self::new();

        // Yahoo Finance: stocks, crypto, currency pairs and FX rates
        match (YahooFinanceProvider::new(), YahooFinanceProvider::new()) {
            (Ok(prices), Ok(rates)) => {
                registry.register(Box::new(prices));
                registry.register_fx(Box::new(rates));
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Yahoo Finance unavailable; market-priced holdings will be skipped");
            }
        }

        // TEFAS: Turkish funds
        registry.register(Box::new(
            TefasProvider::new(settings.tefas_lookback_days, settings.http_timeout_secs)
                .with_request_delay(Duration::from_millis(settings.request_delay_ms)),
        ));

        // Local valuations, no network
        registry.register(Box::new(TimeDepositProvider::new()));
        registry.register(Box::new(ManualProvider::new()));

        registry
    }

    /// Register a new price provider.
    pub fn register(&mut self, provider: Box<dyn PriceProvider>) {
        self.providers.push(provider);
    }

    /// Register a new exchange-rate source.
    pub fn register_fx(&mut self, provider: Box<dyn FxRateProvider>) {
        self.fx_providers.push(provider);
    }

    /// Return ALL providers that support the given asset class, ordered by registration priority.
    /// Used for fallback: if the first provider fails, try the next one.
    pub fn get_providers_for(&self, asset_class: &AssetClass) -> Vec<&dyn PriceProvider> {
        self.providers
            .iter()
            .filter(|p| p.supported_asset_classes().contains(asset_class))
            .map(|p| p.as_ref())
            .collect()
    }

    /// Exchange-rate sources, in registration order.
    pub fn fx_providers(&self) -> Vec<&dyn FxRateProvider> {
        self.fx_providers.iter().map(|p| p.as_ref()).collect()
    }
}

impl Default for PriceProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
